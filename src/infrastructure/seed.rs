use crate::auth::hash_password;
use crate::models::book::{BookFormat, PublicationState};
use crate::models::book_content::ContentType;
use crate::models::{author, book, book_authors, book_content, book_genres, genre, user};
use sea_orm::*;

struct DemoBook {
    title: &'static str,
    description: &'static str,
    price_cents: i64,
    state: PublicationState,
    format: BookFormat,
    release_date: Option<&'static str>,
    duration_minutes: Option<i32>,
    author: usize,
    genre: usize,
    contents: usize,
}

const DEMO_BOOKS: &[DemoBook] = &[
    DemoBook {
        title: "Dune",
        description: "Spice, sand and the fate of a desert planet.",
        price_cents: 999,
        state: PublicationState::Available,
        format: BookFormat::Ebook,
        release_date: Some("1965-08-01"),
        duration_minutes: None,
        author: 0,
        genre: 0,
        contents: 5,
    },
    DemoBook {
        title: "Foundation",
        description: "The fall of the Galactic Empire, predicted.",
        price_cents: 1250,
        state: PublicationState::Available,
        format: BookFormat::Audiobook,
        release_date: Some("1951-06-01"),
        duration_minutes: Some(522),
        author: 1,
        genre: 0,
        contents: 1,
    },
    DemoBook {
        title: "The Hobbit",
        description: "There and back again.",
        price_cents: 850,
        state: PublicationState::Available,
        format: BookFormat::Ebook,
        release_date: Some("1937-09-21"),
        duration_minutes: None,
        author: 2,
        genre: 1,
        contents: 3,
    },
    DemoBook {
        title: "The Silmarillion (Illustrated)",
        description: "The elder days, newly illustrated.",
        price_cents: 2499,
        state: PublicationState::Upcoming,
        format: BookFormat::Ebook,
        release_date: Some("2030-03-15"),
        duration_minutes: None,
        author: 2,
        genre: 1,
        contents: 0,
    },
    DemoBook {
        title: "Children of Dune (Narrated)",
        description: "The third Dune novel, unabridged.",
        price_cents: 1899,
        state: PublicationState::Upcoming,
        format: BookFormat::Audiobook,
        release_date: Some("2030-01-10"),
        duration_minutes: Some(960),
        author: 0,
        genre: 0,
        contents: 0,
    },
];

fn hashed(password: &str) -> Result<String, DbErr> {
    hash_password(password).map_err(DbErr::Custom)
}

/// Demo accounts and catalog. Does nothing when users already exist.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if user::Entity::find().count(db).await? > 0 {
        tracing::info!("Database already has users, skipping demo data");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    // 1. Users
    for (email, name, password, admin) in [
        ("admin@bookstore.local", "Admin", "admin", true),
        ("reader@bookstore.local", "Reader", "reader", false),
    ] {
        user::ActiveModel {
            username: Set(email.to_owned()),
            email: Set(email.to_owned()),
            first_name: Set(name.to_owned()),
            password_hash: Set(hashed(password)?),
            is_staff: Set(admin),
            is_superuser: Set(admin),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    // 2. Genres and authors
    let mut genre_ids = Vec::new();
    for (name, description) in [
        ("Science Fiction", "Futures, near and far."),
        ("Fantasy", "Magic, myth and other worlds."),
    ] {
        let saved = genre::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(description.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        genre_ids.push(saved.id);
    }

    let mut author_ids = Vec::new();
    for name in ["Frank Herbert", "Isaac Asimov", "J.R.R. Tolkien"] {
        let saved = author::ActiveModel {
            name: Set(name.to_owned()),
            biography: Set(String::new()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        author_ids.push(saved.id);
    }

    // 3. Books, links and content
    for demo in DEMO_BOOKS {
        let saved = book::ActiveModel {
            title: Set(demo.title.to_owned()),
            description: Set(demo.description.to_owned()),
            price_cents: Set(demo.price_cents),
            publication_state: Set(demo.state),
            format: Set(demo.format),
            release_date: Set(demo.release_date.map(str::to_owned)),
            duration_minutes: Set(demo.duration_minutes),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        book_authors::Entity::insert(book_authors::ActiveModel {
            book_id: Set(saved.id),
            author_id: Set(author_ids[demo.author]),
        })
        .exec_without_returning(db)
        .await?;
        book_genres::Entity::insert(book_genres::ActiveModel {
            book_id: Set(saved.id),
            genre_id: Set(genre_ids[demo.genre]),
        })
        .exec_without_returning(db)
        .await?;

        for position in 1..=demo.contents {
            let (content_type, media_url) = match demo.format {
                BookFormat::Ebook => (
                    ContentType::Image,
                    format!("books/{}/page-{:03}.jpg", saved.id, position),
                ),
                BookFormat::Audiobook => (
                    ContentType::Audio,
                    format!("books/{}/track-{:02}.mp3", saved.id, position),
                ),
            };
            book_content::ActiveModel {
                book_id: Set(saved.id),
                content_type: Set(content_type),
                position: Set(position as i32),
                media_url: Set(media_url),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    tracing::info!("Seeded {} demo books", DEMO_BOOKS.len());
    Ok(())
}
