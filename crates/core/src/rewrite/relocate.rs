use crate::diagnostics::RewriteTag;
use crate::imports::{DottedPath, ModuleTarget};
use crate::rewrite::emit::{Emitted, EmittedName, RelativeModule, Segment};
use crate::rewrite::engine::{FileState, RewriteContext};
use crate::vendor::FileLocation;

/// Outcome of rewriting one target of a whole-module import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPlan {
    /// Keep the target in a plain `import` statement
    Preserve(RewriteTag),
    Emit {
        statements: Vec<Emitted>,
        tag: RewriteTag,
    },
}

/// Relocation of absolute imports of vendored packages into relative ones.
///
/// All names produced here are original package names; top-level ones are
/// marked so that a rename policy can substitute them afterwards.
pub struct Relocate<'a> {
    context: &'a RewriteContext<'a>,
    location: &'a FileLocation,
}

impl<'a> Relocate<'a> {
    pub fn new(context: &'a RewriteContext<'a>, location: &'a FileLocation) -> Self {
        Self { context, location }
    }

    /// `import root[.rest]` → a selective import binding the leaf
    pub fn module_target(&self, target: &ModuleTarget, state: &mut FileState) -> TargetPlan {
        let path = &target.path;
        let root = self.context.canonical(path.root()).to_string();
        let rest = path.rest();

        match self.location {
            FileLocation::Consumer { depth } => {
                let base = RelativeModule::new(depth + 1)
                    .with(Segment::plain(self.context.vendor_module));
                let statement = if rest.is_empty() {
                    from(base, top_level_name(&root, &target.alias))
                } else {
                    let module = base
                        .with(Segment::top_level(&root))
                        .with_plain(&rest[..rest.len() - 1]);
                    from(module, plain_name(path.leaf(), &target.alias))
                };
                TargetPlan::Emit {
                    statements: vec![statement],
                    tag: RewriteTag::ConsumerImport,
                }
            }
            FileLocation::Vendored {
                depth,
                package,
                is_init,
            } => {
                if self.is_same_package(package.as_deref(), &root) {
                    self.same_package_target(&root, rest, target, *depth, *is_init, state)
                } else {
                    let module = RelativeModule::new(depth + 1);
                    let statement = if rest.is_empty() {
                        from(module, top_level_name(&root, &target.alias))
                    } else {
                        let module = module
                            .with(Segment::top_level(&root))
                            .with_plain(&rest[..rest.len() - 1]);
                        from(module, plain_name(path.leaf(), &target.alias))
                    };
                    TargetPlan::Emit {
                        statements: vec![statement],
                        tag: RewriteTag::CrossPackageImport,
                    }
                }
            }
        }
    }

    fn same_package_target(
        &self,
        root: &str,
        rest: &[String],
        target: &ModuleTarget,
        depth: usize,
        is_init: bool,
        state: &mut FileState,
    ) -> TargetPlan {
        if rest.is_empty() {
            if is_init {
                // The initializer importing its own package: rewriting it
                // would make the module import itself
                return TargetPlan::Preserve(RewriteTag::SamePackageInitCircular);
            }
            return TargetPlan::Emit {
                statements: vec![from(
                    RelativeModule::new(depth + 1),
                    top_level_name(root, &target.alias),
                )],
                tag: RewriteTag::SamePackageSelf,
            };
        }

        let module = RelativeModule::new(1).with_plain(&rest[..rest.len() - 1]);
        let mut statements = vec![from(module, plain_name(target.path.leaf(), &target.alias))];

        if !is_init || target.alias.is_some() {
            return TargetPlan::Emit {
                statements,
                tag: RewriteTag::SamePackageSubmodule,
            };
        }

        // Code in the initializer may keep using `root.attr` after the
        // submodule import, but the package is not yet bound as a name
        // while its own initializer runs.
        if !state.sys_imported {
            statements.push(Emitted::Verbatim("import sys".to_string()));
            state.sys_imported = true;
        }
        if !state.package_bound {
            statements.push(Emitted::Verbatim(format!("{root} = sys.modules[__name__]")));
            state.package_bound = true;
        }
        TargetPlan::Emit {
            statements,
            tag: RewriteTag::SamePackageInitTransform,
        }
    }

    /// New module part for `from module import ...`, or `None` if the
    /// module is not vendored
    pub fn selective(&self, module: &DottedPath) -> Option<(RelativeModule, RewriteTag)> {
        match self.location {
            FileLocation::Consumer { depth } => {
                let module = self.strip_vendor_prefix(module);
                let root = self.context.canonical(module.root());
                if !self.context.packages.contains(root) {
                    return None;
                }
                let relocated = RelativeModule::new(depth + 1)
                    .with(Segment::plain(self.context.vendor_module))
                    .with(Segment::top_level(root))
                    .with_plain(module.rest());
                Some((relocated, RewriteTag::ConsumerFromImport))
            }
            FileLocation::Vendored { depth, package, .. } => {
                let root = self.context.canonical(module.root());
                if !self.context.packages.contains(root) {
                    return None;
                }
                if self.is_same_package(package.as_deref(), root) {
                    let relocated = RelativeModule::new(1).with_plain(module.rest());
                    return Some((relocated, RewriteTag::SamePackageFromImport));
                }
                let relocated = RelativeModule::new(depth + 1)
                    .with(Segment::top_level(root))
                    .with_plain(module.rest());
                Some((relocated, RewriteTag::CrossPackageFromImport))
            }
        }
    }

    /// `vendor.foo.x` in consumer code already names the vendored package
    /// absolutely; treat it as `foo.x`.
    fn strip_vendor_prefix(&self, module: &DottedPath) -> DottedPath {
        if module.root() == self.context.vendor_module {
            if let Some(stripped) = module.without_root() {
                if self
                    .context
                    .packages
                    .contains(self.context.canonical(stripped.root()))
                {
                    return stripped;
                }
            }
        }
        module.clone()
    }

    fn is_same_package(&self, package: Option<&str>, root: &str) -> bool {
        package.is_some_and(|p| self.context.canonical(p) == root)
    }
}

fn from(module: RelativeModule, name: EmittedName) -> Emitted {
    Emitted::From {
        module,
        names: vec![name],
    }
}

fn top_level_name(name: &str, alias: &Option<String>) -> EmittedName {
    EmittedName {
        name: name.to_string(),
        alias: alias.clone(),
        top_level: true,
    }
}

fn plain_name(name: &str, alias: &Option<String>) -> EmittedName {
    EmittedName {
        name: name.to_string(),
        alias: alias.clone(),
        top_level: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::VendoredPackageSet;

    fn target(path: &str) -> ModuleTarget {
        ModuleTarget {
            path: DottedPath::parse(path).unwrap(),
            alias: None,
            text: path.to_string(),
        }
    }

    fn render(plan: &TargetPlan) -> String {
        match plan {
            TargetPlan::Preserve(tag) => format!("<preserved {tag}>"),
            TargetPlan::Emit { statements, .. } => statements
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    fn vendored(depth: usize, package: Option<&str>, is_init: bool) -> FileLocation {
        FileLocation::Vendored {
            depth,
            package: package.map(str::to_string),
            is_init,
        }
    }

    #[test]
    fn test_whole_module_table() {
        let packages: VendoredPackageSet = ["foo", "requests"].into_iter().collect();
        let context = RewriteContext::new(&packages, "vendor");

        let cases = [
            (FileLocation::Consumer { depth: 0 }, "foo", "from .vendor import foo"),
            (FileLocation::Consumer { depth: 0 }, "foo.bar", "from .vendor.foo import bar"),
            (FileLocation::Consumer { depth: 1 }, "foo.bar.spam", "from ..vendor.foo.bar import spam"),
            (vendored(0, None, false), "foo", "from . import foo"),
            (vendored(1, Some("foo"), false), "foo.bar", "from . import bar"),
            (vendored(1, Some("foo"), false), "foo.bar.spam", "from .bar import spam"),
            (vendored(1, Some("foo"), false), "foo", "from .. import foo"),
            (vendored(1, Some("a"), false), "foo.bar", "from ..foo import bar"),
            (vendored(1, Some("a"), false), "requests.auth.basic", "from ..requests.auth import basic"),
            (vendored(2, None, false), "foo", "from ... import foo"),
        ];

        for (location, path, expected) in cases {
            let relocate = Relocate::new(&context, &location);
            let mut state = FileState::default();
            let plan = relocate.module_target(&target(path), &mut state);
            assert_eq!(render(&plan), expected, "import {path} at {location:?}");
        }
    }

    #[test]
    fn test_init_self_import_is_preserved() {
        let packages: VendoredPackageSet = ["foo"].into_iter().collect();
        let context = RewriteContext::new(&packages, "vendor");
        let location = vendored(1, Some("foo"), true);
        let relocate = Relocate::new(&context, &location);
        let plan = relocate.module_target(&target("foo"), &mut FileState::default());
        assert_eq!(plan, TargetPlan::Preserve(RewriteTag::SamePackageInitCircular));
    }

    #[test]
    fn test_init_binding_is_emitted_once() {
        let packages: VendoredPackageSet = ["foo"].into_iter().collect();
        let context = RewriteContext::new(&packages, "vendor");
        let location = vendored(1, Some("foo"), true);
        let relocate = Relocate::new(&context, &location);
        let mut state = FileState::default();

        let first = relocate.module_target(&target("foo.bar"), &mut state);
        let second = relocate.module_target(&target("foo.baz.qux"), &mut state);
        assert_eq!(
            render(&first),
            "from . import bar; import sys; foo = sys.modules[__name__]"
        );
        assert_eq!(render(&second), "from .baz import qux");
    }

    #[test]
    fn test_aliased_init_submodule_skips_binding() {
        let packages: VendoredPackageSet = ["foo"].into_iter().collect();
        let context = RewriteContext::new(&packages, "vendor");
        let location = vendored(1, Some("foo"), true);
        let relocate = Relocate::new(&context, &location);
        let mut aliased = target("foo.bar");
        aliased.alias = Some("fb".to_string());
        let mut state = FileState::default();
        let plan = relocate.module_target(&aliased, &mut state);
        assert_eq!(render(&plan), "from . import bar as fb");
        assert_eq!(state, FileState::default());
    }

    #[test]
    fn test_selective_table() {
        let packages: VendoredPackageSet = ["foo"].into_iter().collect();
        let context = RewriteContext::new(&packages, "vendor");

        let cases = [
            (FileLocation::Consumer { depth: 0 }, "foo", Some(".vendor.foo")),
            (FileLocation::Consumer { depth: 0 }, "vendor.foo.bar", Some(".vendor.foo.bar")),
            (vendored(0, None, false), "foo.bar", Some(".foo.bar")),
            (vendored(1, Some("foo"), false), "foo", Some(".")),
            (vendored(1, Some("foo"), false), "foo.bar", Some(".bar")),
            (vendored(1, Some("a"), false), "foo.bar", Some("..foo.bar")),
            (vendored(1, Some("a"), false), "os.path", None),
            (FileLocation::Consumer { depth: 0 }, "vendor", None),
        ];

        for (location, module, expected) in cases {
            let relocate = Relocate::new(&context, &location);
            let result = relocate
                .selective(&DottedPath::parse(module).unwrap())
                .map(|(m, _)| m.to_string());
            assert_eq!(result.as_deref(), expected, "from {module} at {location:?}");
        }
    }
}
