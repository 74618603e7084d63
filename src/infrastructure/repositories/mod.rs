//! Repository implementations using SeaORM

pub mod author_repository;
pub mod book_repository;
pub(crate) mod filter;
pub mod genre_repository;
pub mod order_repository;
pub mod user_repository;

pub use author_repository::SeaOrmAuthorRepository;
pub use book_repository::SeaOrmBookRepository;
pub use genre_repository::SeaOrmGenreRepository;
pub use order_repository::SeaOrmOrderRepository;
pub use user_repository::SeaOrmUserRepository;
