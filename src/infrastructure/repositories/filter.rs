//! Translation of [`SearchFilter`]s into SeaORM conditions.

use sea_orm::Condition;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};

use crate::domain::search::{
    AuthorField, BookField, Clause, FilterValue, GenreField, Operator, OrderField, Predicate,
    SearchFilter, UserField,
};
use crate::models::{author, book, genre, order, user};

/// Column a search field reads from.
pub(crate) trait FieldColumn: Copy {
    fn column(self) -> SimpleExpr;
}

/// `None` when the filter matches everything.
pub(crate) fn condition<F: FieldColumn>(filter: &SearchFilter<F>) -> Option<Condition> {
    match &filter.predicate {
        Predicate::Everything => None,
        Predicate::Any(clauses) => Some(
            clauses
                .iter()
                .fold(Condition::any(), |cond, clause| cond.add(clause_expr(clause))),
        ),
    }
}

fn clause_expr<F: FieldColumn>(clause: &Clause<F>) -> SimpleExpr {
    let column = clause.field.column();
    match (&clause.op, &clause.value) {
        (Operator::Equals, FilterValue::Int(n) | FilterValue::Cents(n)) => {
            Expr::expr(column).eq(*n)
        }
        (Operator::ContainsIgnoreCase, FilterValue::Text(s)) => Expr::expr(Func::lower(column))
            .like(LikeExpr::new(contains_pattern(s)).escape('\\')),
        // Unmatchable, or a pairing the filter builder never emits
        _ => Expr::cust("1 = 0"),
    }
}

/// `%needle%` with LIKE metacharacters escaped. SQLite's LOWER only folds
/// ASCII, so the needle is folded the same way.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_ascii_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl FieldColumn for BookField {
    fn column(self) -> SimpleExpr {
        match self {
            BookField::Id => Expr::col((book::Entity, book::Column::Id)).into(),
            BookField::Price => Expr::col((book::Entity, book::Column::PriceCents)).into(),
            BookField::Title => Expr::col((book::Entity, book::Column::Title)).into(),
            BookField::Description => Expr::col((book::Entity, book::Column::Description)).into(),
            BookField::PublicationState => {
                Expr::col((book::Entity, book::Column::PublicationState)).into()
            }
            BookField::Format => Expr::col((book::Entity, book::Column::Format)).into(),
            BookField::AuthorName => Expr::col((author::Entity, author::Column::Name)).into(),
            BookField::GenreName => Expr::col((genre::Entity, genre::Column::Name)).into(),
        }
    }
}

impl FieldColumn for GenreField {
    fn column(self) -> SimpleExpr {
        match self {
            GenreField::Id => Expr::col((genre::Entity, genre::Column::Id)).into(),
            GenreField::Name => Expr::col((genre::Entity, genre::Column::Name)).into(),
            GenreField::Description => {
                Expr::col((genre::Entity, genre::Column::Description)).into()
            }
        }
    }
}

impl FieldColumn for AuthorField {
    fn column(self) -> SimpleExpr {
        match self {
            AuthorField::Id => Expr::col((author::Entity, author::Column::Id)).into(),
            AuthorField::Name => Expr::col((author::Entity, author::Column::Name)).into(),
            AuthorField::Biography => Expr::col((author::Entity, author::Column::Biography)).into(),
        }
    }
}

impl FieldColumn for UserField {
    fn column(self) -> SimpleExpr {
        match self {
            UserField::Id => Expr::col((user::Entity, user::Column::Id)).into(),
            UserField::Email => Expr::col((user::Entity, user::Column::Email)).into(),
            UserField::FirstName => Expr::col((user::Entity, user::Column::FirstName)).into(),
            UserField::Username => Expr::col((user::Entity, user::Column::Username)).into(),
        }
    }
}

impl FieldColumn for OrderField {
    fn column(self) -> SimpleExpr {
        match self {
            OrderField::Id => Expr::col((order::Entity, order::Column::Id)).into(),
            OrderField::TotalPaid => {
                Expr::col((order::Entity, order::Column::TotalPaidCents)).into()
            }
            OrderField::UserEmail => Expr::col((user::Entity, user::Column::Email)).into(),
            OrderField::UserFirstName => Expr::col((user::Entity, user::Column::FirstName)).into(),
            OrderField::PaymentState => {
                Expr::col((order::Entity, order::Column::PaymentState)).into()
            }
            OrderField::OrderedAt => Expr::col((order::Entity, order::Column::OrderedAt)).into(),
        }
    }
}
