use crate::imports::{ImportedNames, SelectiveImport};
use crate::parser::TextEdit;
use crate::rewrite::emit::{Emitted, RelativeModule};
use crate::vendor::RenameTable;

/// Rename policy applied on top of [`Relocate`](super::Relocate).
///
/// Top-level packages are referred to by their renamed on-disk name, and
/// every imported top-level name is bound under its original name unless
/// the source already chose an alias.
pub struct AliasForRename<'a> {
    table: &'a RenameTable,
}

impl<'a> AliasForRename<'a> {
    pub fn new(table: &'a RenameTable) -> Self {
        Self { table }
    }

    pub fn apply_module(&self, module: &mut RelativeModule) {
        for segment in module.segments.iter_mut().filter(|s| s.top_level) {
            if let Some(renamed) = self.table.renamed(&segment.name) {
                segment.name = renamed.to_string();
            }
        }
    }

    pub fn apply(&self, statement: &mut Emitted) {
        let Emitted::From { module, names } = statement else {
            return;
        };
        self.apply_module(module);
        for name in names.iter_mut().filter(|n| n.top_level) {
            if let Some(renamed) = self.table.renamed(&name.name) {
                let original = std::mem::replace(&mut name.name, renamed.to_string());
                if name.alias.is_none() {
                    name.alias = Some(original);
                }
            }
        }
    }

    /// Alias insertions for an already-relative import that binds renamed
    /// packages without an alias, e.g. `from .. import foo_1`.
    pub fn relative_aliases(&self, import: &SelectiveImport) -> Vec<TextEdit> {
        let ImportedNames::Names(names) = &import.names else {
            return Vec::new();
        };
        names
            .iter()
            .filter(|n| n.alias.is_none())
            .filter_map(|n| {
                self.table
                    .original_of(&n.name)
                    .map(|original| TextEdit::insert(n.name_end, format!(" as {original}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::emit::{EmittedName, Segment};
    use crate::vendor::VendoredPackageSet;

    fn table() -> RenameTable {
        let packages: VendoredPackageSet = ["foo", "six"].into_iter().collect();
        RenameTable::new(&packages, "42").unwrap()
    }

    #[test]
    fn test_top_level_name_gets_alias() {
        let table = table();
        let policy = AliasForRename::new(&table);
        let mut statement = Emitted::From {
            module: RelativeModule::new(2),
            names: vec![EmittedName {
                name: "foo".to_string(),
                alias: None,
                top_level: true,
            }],
        };
        policy.apply(&mut statement);
        assert_eq!(statement.to_string(), "from .. import foo_42 as foo");
    }

    #[test]
    fn test_existing_alias_is_kept() {
        let table = table();
        let policy = AliasForRename::new(&table);
        let mut statement = Emitted::From {
            module: RelativeModule::new(1).with(Segment::plain("vendor")),
            names: vec![EmittedName {
                name: "six".to_string(),
                alias: Some("sx".to_string()),
                top_level: true,
            }],
        };
        policy.apply(&mut statement);
        assert_eq!(statement.to_string(), "from .vendor import six_42 as sx");
    }

    #[test]
    fn test_module_segments_are_renamed_without_alias() {
        let table = table();
        let policy = AliasForRename::new(&table);
        let mut statement = Emitted::From {
            module: RelativeModule::new(2)
                .with(Segment::top_level("foo"))
                .with(Segment::plain("six")),
            names: vec![EmittedName {
                name: "moves".to_string(),
                alias: None,
                top_level: false,
            }],
        };
        policy.apply(&mut statement);
        assert_eq!(statement.to_string(), "from ..foo_42.six import moves");
    }

    #[test]
    fn test_verbatim_is_untouched() {
        let table = table();
        let policy = AliasForRename::new(&table);
        let mut statement = Emitted::Verbatim("foo = sys.modules[__name__]".to_string());
        policy.apply(&mut statement);
        assert_eq!(statement.to_string(), "foo = sys.modules[__name__]");
    }
}
