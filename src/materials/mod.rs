// Copyright @yucwang 2023

pub mod fresnel;
pub mod hemisphere;
