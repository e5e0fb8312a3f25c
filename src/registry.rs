use std::collections::BTreeMap;
use std::sync::RwLock;

use csv_dialect_core::{Dialect, DialectBuilder, QuoteStyle};
use lazy_static::lazy_static;

use crate::error::{Error, Result};

lazy_static! {
    static ref DIALECTS: RwLock<BTreeMap<String, Dialect>> = {
        let mut map = BTreeMap::new();
        map.insert("excel".to_string(), Dialect::excel());
        map.insert("excel-tab".to_string(), Dialect::excel_tab());
        map.insert("unix".to_string(), Dialect::unix());
        RwLock::new(map)
    };
}

/// Register a dialect under `name`, replacing any dialect already registered
/// under that name.
///
/// The registry is shared by the whole process and starts out with the
/// `excel`, `excel-tab` and `unix` dialects.
///
/// # Example
///
/// ```
/// use csv_dialect::{get_dialect, register_dialect, Dialect};
///
/// let pipes = Dialect::excel().builder().delimiter('|').build().unwrap();
/// register_dialect("pipes", pipes.clone());
/// assert_eq!(pipes, get_dialect("pipes").unwrap());
/// ```
pub fn register_dialect<S: Into<String>>(name: S, dialect: Dialect) {
    let name = name.into();
    log::debug!("registering dialect {:?}: {:?}", name, dialect);
    let mut map = DIALECTS.write().unwrap_or_else(|e| e.into_inner());
    map.insert(name, dialect);
}

/// Remove the dialect registered under `name`.
///
/// This fails with `Error::UnknownDialect` if no such dialect exists.
pub fn unregister_dialect(name: &str) -> Result<()> {
    let mut map = DIALECTS.write().unwrap_or_else(|e| e.into_inner());
    match map.remove(name) {
        None => Err(Error::UnknownDialect(name.to_string())),
        Some(_) => {
            log::debug!("unregistered dialect {:?}", name);
            Ok(())
        }
    }
}

/// Look up the dialect registered under `name`.
///
/// This fails with `Error::UnknownDialect` if no such dialect exists.
pub fn get_dialect(name: &str) -> Result<Dialect> {
    let map = DIALECTS.read().unwrap_or_else(|e| e.into_inner());
    map.get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownDialect(name.to_string()))
}

/// Returns the names of all registered dialects, in sorted order.
pub fn list_dialects() -> Vec<String> {
    let map = DIALECTS.read().unwrap_or_else(|e| e.into_inner());
    map.keys().cloned().collect()
}

/// Where a builder gets its dialect from, plus any individual overrides.
///
/// Names are resolved in `resolve`, so that a builder can be configured
/// before the dialect it names is registered.
#[derive(Clone, Debug, Default)]
pub(crate) struct DialectChoice {
    base: Base,
    delimiter: Option<char>,
    quotechar: Option<Option<char>>,
    escapechar: Option<Option<char>>,
    lineterminator: Option<String>,
    quoting: Option<QuoteStyle>,
    doublequote: Option<bool>,
    skipinitialspace: Option<bool>,
    strict: Option<bool>,
}

#[derive(Clone, Debug)]
enum Base {
    Dialect(Dialect),
    Name(String),
}

impl Default for Base {
    fn default() -> Base {
        Base::Dialect(Dialect::excel())
    }
}

impl DialectChoice {
    pub(crate) fn set_dialect(&mut self, dialect: Dialect) {
        self.base = Base::Dialect(dialect);
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.base = Base::Name(name.to_string());
    }

    pub(crate) fn delimiter(&mut self, delimiter: char) {
        self.delimiter = Some(delimiter);
    }

    pub(crate) fn quotechar(&mut self, quote: Option<char>) {
        self.quotechar = Some(quote);
    }

    pub(crate) fn escapechar(&mut self, escape: Option<char>) {
        self.escapechar = Some(escape);
    }

    pub(crate) fn lineterminator(&mut self, term: String) {
        self.lineterminator = Some(term);
    }

    pub(crate) fn quoting(&mut self, style: QuoteStyle) {
        self.quoting = Some(style);
    }

    pub(crate) fn doublequote(&mut self, yes: bool) {
        self.doublequote = Some(yes);
    }

    pub(crate) fn skipinitialspace(&mut self, yes: bool) {
        self.skipinitialspace = Some(yes);
    }

    pub(crate) fn strict(&mut self, yes: bool) {
        self.strict = Some(yes);
    }

    /// Look up the base dialect and apply the overrides to it.
    pub(crate) fn resolve(&self) -> Result<Dialect> {
        let base = match self.base {
            Base::Dialect(ref dialect) => dialect.clone(),
            Base::Name(ref name) => get_dialect(name)?,
        };
        let mut builder = DialectBuilder::from_dialect(&base);
        if let Some(delimiter) = self.delimiter {
            builder.delimiter(delimiter);
        }
        if let Some(quote) = self.quotechar {
            builder.quotechar(quote);
        }
        if let Some(escape) = self.escapechar {
            builder.escapechar(escape);
        }
        if let Some(ref term) = self.lineterminator {
            builder.lineterminator(term.as_str());
        }
        if let Some(style) = self.quoting {
            builder.quoting(style);
        }
        if let Some(yes) = self.doublequote {
            builder.doublequote(yes);
        }
        if let Some(yes) = self.skipinitialspace {
            builder.skipinitialspace(yes);
        }
        if let Some(yes) = self.strict {
            builder.strict(yes);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use csv_dialect_core::{Dialect, QuoteStyle};

    use super::{
        get_dialect, list_dialects, register_dialect, unregister_dialect,
        DialectChoice,
    };

    #[test]
    fn builtins() {
        let names = list_dialects();
        for name in &["excel", "excel-tab", "unix"] {
            assert!(names.iter().any(|n| n == name), "missing {}", name);
        }
        assert_eq!(Dialect::excel(), get_dialect("excel").unwrap());
        assert_eq!('\t', get_dialect("excel-tab").unwrap().delimiter());
        let unix = get_dialect("unix").unwrap();
        assert_eq!("\n", unix.lineterminator());
        assert_eq!(QuoteStyle::Always, unix.quoting());
    }

    #[test]
    fn sorted() {
        let names = list_dialects();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, names);
    }

    #[test]
    fn register_and_unregister() {
        let semi = Dialect::excel().builder().delimiter(';').build().unwrap();
        register_dialect("registry-test-semi", semi.clone());
        assert_eq!(semi, get_dialect("registry-test-semi").unwrap());
        assert!(list_dialects().iter().any(|n| n == "registry-test-semi"));

        unregister_dialect("registry-test-semi").unwrap();
        let err = get_dialect("registry-test-semi").unwrap_err();
        assert!(err.is_not_found());
        assert!(unregister_dialect("registry-test-semi")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn replace() {
        register_dialect("registry-test-replace", Dialect::excel());
        register_dialect("registry-test-replace", Dialect::unix());
        assert_eq!(Dialect::unix(), get_dialect("registry-test-replace").unwrap());
        unregister_dialect("registry-test-replace").unwrap();
    }

    #[test]
    fn choice_overrides_base() {
        let mut choice = DialectChoice::default();
        choice.set_name("excel-tab");
        choice.quoting(QuoteStyle::Never);
        choice.quotechar(None);
        let d = choice.resolve().unwrap();
        assert_eq!('\t', d.delimiter());
        assert_eq!(None, d.quotechar());
        assert_eq!(QuoteStyle::Never, d.quoting());
    }

    #[test]
    fn choice_errors() {
        let mut choice = DialectChoice::default();
        choice.set_name("registry-test-missing");
        assert!(choice.resolve().unwrap_err().is_not_found());

        let mut choice = DialectChoice::default();
        choice.set_dialect(Dialect::excel());
        choice.delimiter('"');
        assert!(choice.resolve().unwrap_err().is_config());
    }
}
