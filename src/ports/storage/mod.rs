mod object_store;

pub use object_store::{ListPage, ObjectStore, UploadSigner};
