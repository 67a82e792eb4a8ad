use std::collections::BTreeSet;

use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter};

/// Runtime helpers a re-export instruction may depend on. The Display name
/// is the identifier the helper is declared as in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay, EnumIter)]
pub enum RuntimeHelper {
    /// Define getters for a set of names on an exports object.
    #[strum(serialize = "__export")]
    Export,
    /// Copy every own enumerable property of a module onto an exports object.
    #[strum(serialize = "__reExport")]
    ReExport,
    /// Wrap a CommonJS exports object as an ES namespace.
    #[strum(serialize = "__toESM")]
    ToEsm,
    /// Merge runtime namespaces into a frozen ES namespace object.
    #[strum(serialize = "__mergeNamespaces")]
    MergeNamespaces,
}

impl RuntimeHelper {
    pub fn deps(&self) -> &'static [RuntimeHelper] {
        match self {
            RuntimeHelper::ToEsm => &[RuntimeHelper::ReExport],
            RuntimeHelper::Export | RuntimeHelper::ReExport | RuntimeHelper::MergeNamespaces => &[],
        }
    }

    pub fn snippet(&self) -> &'static str {
        match self {
            RuntimeHelper::Export => {
                r#"var __export = (target, all) => {
  for (var name in all)
    Object.defineProperty(target, name, { get: all[name], enumerable: true });
};"#
            }
            RuntimeHelper::ReExport => {
                r#"var __reExport = (target, mod, skip = []) => {
  for (let key of Object.keys(mod))
    if (key !== "default" && !skip.includes(key) && !Object.prototype.hasOwnProperty.call(target, key))
      Object.defineProperty(target, key, { get: () => mod[key], enumerable: true });
  return target;
};"#
            }
            RuntimeHelper::ToEsm => {
                r#"var __toESM = (mod) => mod && mod.__esModule
  ? mod
  : __reExport(Object.defineProperty({}, "default", { value: mod, enumerable: true }), mod);"#
            }
            RuntimeHelper::MergeNamespaces => {
                r#"var __mergeNamespaces = (n, m, skip = []) => {
  m.forEach((e) => e && typeof e !== "string" && !Array.isArray(e) && Object.keys(e).forEach((k) => {
    if (k !== "default" && !skip.includes(k) && !(k in n)) {
      var d = Object.getOwnPropertyDescriptor(e, k);
      Object.defineProperty(n, k, d.get ? d : { enumerable: true, get: () => e[k] });
    }
  }));
  return Object.freeze(n);
};"#
            }
        }
    }
}

/// Set of helpers used by one or more plans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeHelpers {
    used: BTreeSet<RuntimeHelper>,
}

impl RuntimeHelpers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a helper as used, along with every helper it calls.
    pub fn use_helper(&mut self, helper: RuntimeHelper) {
        if self.used.insert(helper) {
            for &dep in helper.deps() {
                self.use_helper(dep);
            }
        }
    }

    pub fn contains(&self, helper: RuntimeHelper) -> bool {
        self.used.contains(&helper)
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn extend_from(&mut self, other: &RuntimeHelpers) {
        for &helper in &other.used {
            self.use_helper(helper);
        }
    }

    /// Declared names of the used helpers, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|h| h.to_string()).collect()
    }

    /// Snippets of the used helpers. Dependencies are declared first.
    pub fn render(&self) -> String {
        let mut s = String::new();
        for helper in self.iter() {
            s += helper.snippet();
            s += "\n";
        }
        s
    }

    /// Declaration order of the enum puts every helper after its deps.
    fn iter(&self) -> impl Iterator<Item = RuntimeHelper> + '_ {
        RuntimeHelper::iter().filter(|h| self.used.contains(h))
    }
}
