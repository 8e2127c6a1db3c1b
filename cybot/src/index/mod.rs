pub mod registry;
pub mod store;
pub mod vector;

pub use registry::DocumentIndexRegistry;
pub use store::{LoadedIndex, load_index, save_index};
pub use vector::{VectorIndex, cosine_similarity};
