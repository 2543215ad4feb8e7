//! Entity name inference from RPC method names
//!
//! `ListBooks`, `GetBook` and `DeleteBook` all point at the `Book` entity;
//! `CreateBook`/`UpdateBook` name it directly. Messages that no method refers
//! to this way are not entities and are never entity-checked.

use crate::descriptor::FileDescriptor;
use std::collections::BTreeSet;

/// Whether a CRUD prefix is followed by a collection name that must be singularized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudKind {
    /// `List`, `Get`, `Delete`: the remainder may be plural
    Collection,
    /// `Update`, `Create`: the remainder is the entity name as written
    Entity,
}

/// CRUD prefixes in match order; the first match wins.
pub const CRUD_METHOD_PREFIXES: &[(&str, CrudKind)] = &[
    ("List", CrudKind::Collection),
    ("Get", CrudKind::Collection),
    ("Delete", CrudKind::Collection),
    ("Update", CrudKind::Entity),
    ("Create", CrudKind::Entity),
];

/// Turns a plural noun into its singular form.
pub trait Singularizer {
    fn singular(&self, word: &str) -> String;
}

/// English singularizer backed by the `pluralize` rule set.
///
/// Suffix rules rewrite only the tail of the word, so PascalCase compounds
/// such as `BookCategories` keep their leading words intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishSingularizer;

impl Singularizer for EnglishSingularizer {
    fn singular(&self, word: &str) -> String {
        pluralizer::pluralize(word, 1, false)
    }
}

/// Infers the entity a method operates on, e.g. `ListBookCategories` -> `BookCategory`.
pub fn infer_entity_from_method_name(
    method_name: &str,
    singularizer: &dyn Singularizer,
) -> Option<String> {
    let (prefix, kind) = CRUD_METHOD_PREFIXES
        .iter()
        .find(|(prefix, _)| method_name.starts_with(prefix))?;

    let remainder = &method_name[prefix.len()..];
    if remainder.is_empty() {
        return None;
    }

    let entity = match kind {
        CrudKind::Collection => singularizer.singular(remainder),
        CrudKind::Entity => remainder.to_string(),
    };
    Some(entity)
}

/// Entity names referenced by the methods of every service in `file`.
pub fn extract_entity_names(file: &FileDescriptor, singularizer: &dyn Singularizer) -> BTreeSet<String> {
    file.methods()
        .filter_map(|method| infer_entity_from_method_name(&method.name, singularizer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{MethodDescriptor, ServiceDescriptor};

    fn infer(name: &str) -> Option<String> {
        infer_entity_from_method_name(name, &EnglishSingularizer)
    }

    #[test]
    fn test_singularize() {
        let s = EnglishSingularizer;
        assert_eq!(s.singular("Books"), "Book");
        assert_eq!(s.singular("Categories"), "Category");
        assert_eq!(s.singular("BookCategories"), "BookCategory");
        assert_eq!(s.singular("Boxes"), "Box");
        assert_eq!(s.singular("Aliases"), "Alias");
        assert_eq!(s.singular("Alias"), "Alias");
        assert_eq!(s.singular("Movies"), "Movie");
        assert_eq!(s.singular("Book"), "Book");
    }

    #[test]
    fn test_infer_entity_from_method_name() {
        assert_eq!(infer("ListBooks").as_deref(), Some("Book"));
        assert_eq!(infer("GetBook").as_deref(), Some("Book"));
        assert_eq!(infer("DeleteBookCategories").as_deref(), Some("BookCategory"));
        assert_eq!(infer("CreateBook").as_deref(), Some("Book"));
        assert_eq!(infer("GetAlias").as_deref(), Some("Alias"));
        assert_eq!(infer("ListAliases").as_deref(), Some("Alias"));
        assert_eq!(infer("ListMovies").as_deref(), Some("Movie"));
        // Update/Create remainders are not singularized.
        assert_eq!(infer("UpdateSettings").as_deref(), Some("Settings"));
        assert_eq!(infer("HelloWorld"), None);
        assert_eq!(infer("List"), None);
    }

    struct Identity;

    impl Singularizer for Identity {
        fn singular(&self, word: &str) -> String {
            word.to_string()
        }
    }

    #[test]
    fn test_extract_entity_names_collapses_duplicates() {
        let service = ServiceDescriptor::new("BookService", Some("library.v1"))
            .with_method(MethodDescriptor::new("ListBooks"))
            .with_method(MethodDescriptor::new("GetBook"))
            .with_method(MethodDescriptor::new("CreateBook"))
            .with_method(MethodDescriptor::new("Ping"));
        let file = FileDescriptor::new("library.proto", Some("library.v1")).with_service(service);

        let names: Vec<_> = extract_entity_names(&file, &EnglishSingularizer).into_iter().collect();
        assert_eq!(names, vec!["Book"]);

        let names: Vec<_> = extract_entity_names(&file, &Identity).into_iter().collect();
        assert_eq!(names, vec!["Book", "Books"]);
    }
}
