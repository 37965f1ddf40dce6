mod backend;

pub use backend::{create_store, exists, open_stream, put_stream, ByteStream};
