// Sample data loaded at startup when no other source is wired in

use crate::models::{CatalogItem, Observation};

pub fn sample_books() -> Vec<CatalogItem> {
    vec![
        book(1, "The Great Gatsby", "F. Scott Fitzgerald", "Classic", 4.2),
        book(2, "Dune", "Frank Herbert", "Sci-Fi", 4.5),
        book(3, "The Hobbit", "J.R.R. Tolkien", "Fantasy", 4.8),
    ]
}

/// (user, book, rating) history on a 1..=5 scale
pub fn sample_ratings() -> Vec<Observation> {
    [
        (1, 1, 5.0),
        (1, 2, 4.0),
        (2, 1, 4.0),
        (2, 3, 5.0),
        (3, 2, 3.0),
        (3, 3, 4.0),
    ]
    .into_iter()
    .map(|(user_id, item_id, rating)| Observation::new(user_id, item_id, rating))
    .collect()
}

fn book(id: i64, title: &str, author: &str, genre: &str, rating: f64) -> CatalogItem {
    CatalogItem {
        id,
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
        rating: Some(rating),
    }
}
