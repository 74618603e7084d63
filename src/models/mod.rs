pub mod author;
pub mod book;
pub mod book_authors;
pub mod book_content;
pub mod book_genres;
pub mod genre;
pub mod library_entry;
pub mod order;
pub mod order_line;
pub mod user;

pub use book::Book;
pub use user::UserDto;
