// Copyright @yucwang 2021

pub mod interaction;
pub mod material;
pub mod material_loader;
pub mod path_segment;
pub mod rng;
pub mod scatter;
