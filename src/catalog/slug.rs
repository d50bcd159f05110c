use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use unicode_normalization::UnicodeNormalization;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());

/// Pattern an explicitly supplied slug has to match.
pub static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Turns a display name into a URL-safe slug: "Men's Shoes" becomes `mens-shoes`.
///
/// Letters are compatibility-decomposed first so accents fall away ("Ü" keeps
/// its "u"). Characters outside ASCII letters, digits, `_`, whitespace and `-`
/// are then dropped, whitespace and hyphen runs become a single `-`, and
/// `-`/`_` are trimmed from both ends. Feeding the result back in returns it
/// unchanged.
pub fn slugify(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let kept = DISALLOWED.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&kept, "-");

    joined.trim_matches(|c| c == '-' || c == '_').to_owned()
}

pub async fn slug_taken<E, C>(db: &C, column: E::Column, slug: &str) -> Result<bool, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let existing = E::find().filter(column.eq(slug)).one(db).await?;
    Ok(existing.is_some())
}

/// Derives a slug for `name` that no row of `E` uses yet.
///
/// Collisions get the first free numeric suffix (`-2`, `-3`, ...). When the
/// name has nothing sluggable in it, `fallback` is used as the base instead.
pub async fn unique_slug<E, C>(
    db: &C,
    column: E::Column,
    name: &str,
    fallback: &str,
) -> Result<String, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let base = match slugify(name) {
        derived if derived.is_empty() => fallback.to_owned(),
        derived => derived,
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    while slug_taken::<E, C>(db, column, &candidate).await? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }

    Ok(candidate)
}
