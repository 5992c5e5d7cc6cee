//! Item kinds and kind-filter equivalence.

/// Every kind of documented item, in raw-index ordinal order.
///
/// The discriminants are the ordinals used by the raw ingestion format and
/// double as the sort precedence of the ranker's kind tie-break, so the
/// order must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ItemKind {
    Module,
    ExternCrate,
    Import,
    Struct,
    Enum,
    Function,
    Typedef,
    Static,
    Trait,
    Impl,
    TyMethod,
    Method,
    StructField,
    Variant,
    Macro,
    Primitive,
    AssocType,
    Constant,
    AssocConst,
    Union,
    ForeignType,
    Keyword,
    Existential,
    Attr,
    Derive,
    TraitAlias,
}

impl ItemKind {
    pub(crate) const ALL: [Self; 26] = [
        Self::Module,
        Self::ExternCrate,
        Self::Import,
        Self::Struct,
        Self::Enum,
        Self::Function,
        Self::Typedef,
        Self::Static,
        Self::Trait,
        Self::Impl,
        Self::TyMethod,
        Self::Method,
        Self::StructField,
        Self::Variant,
        Self::Macro,
        Self::Primitive,
        Self::AssocType,
        Self::Constant,
        Self::AssocConst,
        Self::Union,
        Self::ForeignType,
        Self::Keyword,
        Self::Existential,
        Self::Attr,
        Self::Derive,
        Self::TraitAlias,
    ];

    /// The kind's name in the raw format and in query filters.
    pub fn name(self) -> &'static str {
        match self {
            Self::Module => "mod",
            Self::ExternCrate => "externcrate",
            Self::Import => "import",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Function => "fn",
            Self::Typedef => "type",
            Self::Static => "static",
            Self::Trait => "trait",
            Self::Impl => "impl",
            Self::TyMethod => "tymethod",
            Self::Method => "method",
            Self::StructField => "structfield",
            Self::Variant => "variant",
            Self::Macro => "macro",
            Self::Primitive => "primitive",
            Self::AssocType => "associatedtype",
            Self::Constant => "constant",
            Self::AssocConst => "associatedconstant",
            Self::Union => "union",
            Self::ForeignType => "foreigntype",
            Self::Keyword => "keyword",
            Self::Existential => "existential",
            Self::Attr => "attr",
            Self::Derive => "derive",
            Self::TraitAlias => "traitalias",
        }
    }

    /// The kind's position in the enumeration (the raw-format ordinal).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Resolves a query filter name; `const` is accepted for `constant`.
    pub(crate) fn from_filter_name(name: &str) -> Option<Self> {
        if name == "const" {
            Some(Self::Constant)
        } else {
            Self::from_name(name)
        }
    }

    /// Primitive and keyword pages rank above every other kind.
    pub(crate) fn is_promoted(self) -> bool {
        matches!(self, Self::Primitive | Self::Keyword)
    }
}

/// Whether an item kind satisfies a requested kind filter.
///
/// Beyond exact equality, three equivalence classes apply: `constant` covers
/// associated constants, `fn` covers methods and required trait methods, and
/// `type` covers primitive and keyword pages.
pub fn passes_filter(filter: Option<ItemKind>, kind: ItemKind) -> bool {
    match filter {
        None => true,
        Some(filter) if filter == kind => true,
        Some(ItemKind::Constant) => kind == ItemKind::AssocConst,
        Some(ItemKind::Function) => matches!(kind, ItemKind::Method | ItemKind::TyMethod),
        Some(ItemKind::Typedef) => matches!(kind, ItemKind::Primitive | ItemKind::Keyword),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn ordinals_round_trip() {
        for (ordinal, kind) in ItemKind::ALL.iter().enumerate() {
            check!(kind.ordinal() == ordinal as u8);
            check!(ItemKind::from_ordinal(ordinal as u8) == Some(*kind));
            check!(ItemKind::from_name(kind.name()) == Some(*kind));
        }
        check!(ItemKind::from_ordinal(26).is_none());
    }

    #[test]
    fn filter_name_normalizes_const() {
        check!(ItemKind::from_filter_name("const") == Some(ItemKind::Constant));
        check!(ItemKind::from_filter_name("constant") == Some(ItemKind::Constant));
        check!(ItemKind::from_filter_name("fn") == Some(ItemKind::Function));
        check!(ItemKind::from_filter_name("bogus").is_none());
    }

    #[rstest]
    #[case(None, ItemKind::Struct, true)]
    #[case(Some(ItemKind::Struct), ItemKind::Struct, true)]
    #[case(Some(ItemKind::Function), ItemKind::Method, true)]
    #[case(Some(ItemKind::Function), ItemKind::TyMethod, true)]
    #[case(Some(ItemKind::Function), ItemKind::Struct, false)]
    #[case(Some(ItemKind::Constant), ItemKind::AssocConst, true)]
    #[case(Some(ItemKind::Constant), ItemKind::Static, false)]
    #[case(Some(ItemKind::Typedef), ItemKind::Primitive, true)]
    #[case(Some(ItemKind::Typedef), ItemKind::Keyword, true)]
    #[case(Some(ItemKind::Typedef), ItemKind::Struct, false)]
    #[case(Some(ItemKind::Method), ItemKind::Function, false)]
    fn filter_equivalence(
        #[case] filter: Option<ItemKind>,
        #[case] kind: ItemKind,
        #[case] expected: bool,
    ) {
        check!(passes_filter(filter, kind) == expected);
    }
}
