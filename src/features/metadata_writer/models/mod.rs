mod artifact;

pub use artifact::{Artifact, Delivery, WriteRequest, WriteResult};
