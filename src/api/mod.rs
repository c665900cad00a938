pub mod books;
pub mod client;
pub mod completions;
pub mod error;
pub mod groups;
pub mod session;
pub mod shelf;

pub use books::BookCatalog;
pub use client::ApiClient;
pub use completions::CompletionStore;
pub use error::ApiError;
pub use groups::GroupDirectory;
pub use session::ApiSession;
pub use shelf::ShelfStore;
