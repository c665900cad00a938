pub mod book;
pub mod completion;
pub mod group;
pub mod record;

pub use book::{Book, BookDetail, BookId, NewBook};
pub use completion::{CompletionReceipt, NewReadingCompletion, ReadingCompletion};
pub use group::ReadingGroup;
pub use record::{NewReadingRecord, ReadingRecord, RecordId};
