pub mod dataset;
pub mod empatica;
pub mod text;
