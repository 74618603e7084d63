//! Search query dispatch for the admin list views.
//!
//! A raw `?q=` string is interpreted either numerically (identifier and, for
//! priced entities, price equality) or as a case-insensitive substring match
//! over the entity's text fields. The two interpretations never mix: a query
//! that parses as a number is never matched against text.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::money::Money;

/// Comparison applied by a [`Clause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    ContainsIgnoreCase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Int(i64),
    /// Price in cents
    Cents(i64),
    /// Numeric value no stored record can hold
    Unmatchable,
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<F> {
    pub field: F,
    pub op: Operator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<F> {
    /// No `q`: every record, in the entity's default order
    Everything,
    /// OR of all clauses
    Any(Vec<Clause<F>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter<F> {
    pub numeric: bool,
    pub predicate: Predicate<F>,
}

impl<F> SearchFilter<F> {
    pub fn everything() -> Self {
        Self {
            numeric: false,
            predicate: Predicate::Everything,
        }
    }

    /// True when the filter traverses a join and needs `DISTINCT`.
    pub fn needs_distinct(&self) -> bool
    where
        F: Copy + JoinedField,
    {
        match &self.predicate {
            Predicate::Everything => false,
            Predicate::Any(clauses) => clauses.iter().any(|c| c.field.is_joined()),
        }
    }
}

/// Fields reached through a join rather than the entity's own table.
pub trait JoinedField: Sized {
    fn is_joined(self) -> bool {
        false
    }
}

/// An entity the admin list views can search.
pub trait Searchable {
    type Field: Copy + std::fmt::Debug + PartialEq + JoinedField + 'static;

    const ID: Self::Field;
    /// Price column, for entities that carry one.
    const PRICE: Option<Self::Field>;
    const TEXT_FIELDS: &'static [Self::Field];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Id,
    Price,
    Title,
    Description,
    PublicationState,
    Format,
    AuthorName,
    GenreName,
}

impl JoinedField for BookField {
    fn is_joined(self) -> bool {
        matches!(self, BookField::AuthorName | BookField::GenreName)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreField {
    Id,
    Name,
    Description,
}

impl JoinedField for GenreField {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorField {
    Id,
    Name,
    Biography,
}

impl JoinedField for AuthorField {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Email,
    FirstName,
    Username,
}

impl JoinedField for UserField {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    TotalPaid,
    UserEmail,
    UserFirstName,
    PaymentState,
    OrderedAt,
}

// Order -> User is many-to-one, so the join never duplicates rows.
impl JoinedField for OrderField {}

pub struct Books;
pub struct Genres;
pub struct Authors;
pub struct Users;
pub struct Orders;

impl Searchable for Books {
    type Field = BookField;
    const ID: BookField = BookField::Id;
    const PRICE: Option<BookField> = Some(BookField::Price);
    const TEXT_FIELDS: &'static [BookField] = &[
        BookField::Title,
        BookField::Description,
        BookField::PublicationState,
        BookField::Format,
        BookField::AuthorName,
        BookField::GenreName,
    ];
}

impl Searchable for Genres {
    type Field = GenreField;
    const ID: GenreField = GenreField::Id;
    const PRICE: Option<GenreField> = None;
    const TEXT_FIELDS: &'static [GenreField] = &[GenreField::Name, GenreField::Description];
}

impl Searchable for Authors {
    type Field = AuthorField;
    const ID: AuthorField = AuthorField::Id;
    const PRICE: Option<AuthorField> = None;
    const TEXT_FIELDS: &'static [AuthorField] = &[AuthorField::Name, AuthorField::Biography];
}

impl Searchable for Users {
    type Field = UserField;
    const ID: UserField = UserField::Id;
    const PRICE: Option<UserField> = None;
    const TEXT_FIELDS: &'static [UserField] =
        &[UserField::Email, UserField::FirstName, UserField::Username];
}

impl Searchable for Orders {
    type Field = OrderField;
    const ID: OrderField = OrderField::Id;
    const PRICE: Option<OrderField> = Some(OrderField::TotalPaid);
    const TEXT_FIELDS: &'static [OrderField] = &[
        OrderField::UserEmail,
        OrderField::UserFirstName,
        OrderField::PaymentState,
        OrderField::OrderedAt,
    ];
}

/// Build the filter for a raw `q` parameter.
pub fn build_filter<S: Searchable>(query: Option<&str>) -> SearchFilter<S::Field> {
    let raw = match query {
        Some(q) if !q.is_empty() => q,
        _ => return SearchFilter::everything(),
    };

    let mut clauses = Vec::new();

    if let Some(literal) = integer_literal(raw) {
        // Integers past the id range stay numeric but match nothing
        let value = literal
            .parse::<i64>()
            .map_or(FilterValue::Unmatchable, FilterValue::Int);
        clauses.push(Clause {
            field: S::ID,
            op: Operator::Equals,
            value,
        });
    }

    if let Some(price) = S::PRICE
        && let Some(d) = parse_decimal(raw)
    {
        let value = match Money::from_decimal(d) {
            Some(m) => FilterValue::Cents(m.cents()),
            None => FilterValue::Unmatchable,
        };
        clauses.push(Clause {
            field: price,
            op: Operator::Equals,
            value,
        });
    }

    if !clauses.is_empty() {
        return SearchFilter {
            numeric: true,
            predicate: Predicate::Any(clauses),
        };
    }

    let clauses = S::TEXT_FIELDS
        .iter()
        .map(|&field| Clause {
            field,
            op: Operator::ContainsIgnoreCase,
            value: FilterValue::Text(raw.to_string()),
        })
        .collect();

    SearchFilter {
        numeric: false,
        predicate: Predicate::Any(clauses),
    }
}

/// Integer literal with optional sign, surrounding whitespace ignored and `_`
/// permitted between digits (`1_000`). Returned without the separators, of
/// any length.
fn integer_literal(raw: &str) -> Option<String> {
    let s = raw.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if !valid_digit_run(digits) {
        return None;
    }
    Some(s.chars().filter(|&c| c != '_').collect())
}

fn valid_digit_run(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_digit() || !bytes[bytes.len() - 1].is_ascii_digit() {
        return false;
    }
    bytes
        .windows(2)
        .all(|w| w[0].is_ascii_digit() || (w[0] == b'_' && w[1].is_ascii_digit()))
        && bytes.iter().all(|b| b.is_ascii_digit() || *b == b'_')
}

/// Plain (`9.99`) or scientific (`1e3`) decimal.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = strip_separators(raw.trim())?;
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

/// Drop `_` digit separators. Each one must sit between two digits.
fn strip_separators(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c != '_' {
            out.push(c);
            continue;
        }
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + 1).copied();
        if !(before.is_some_and(|b| b.is_ascii_digit()) && after.is_some_and(|b| b.is_ascii_digit()))
        {
            return None;
        }
    }
    Some(out)
}
