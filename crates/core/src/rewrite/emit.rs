use std::fmt;

/// One component of an emitted module path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    /// Whether this is a vendored top-level package subject to renaming
    pub top_level: bool,
}

impl Segment {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_level: false,
        }
    }

    pub fn top_level(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_level: true,
        }
    }
}

/// Module part of a relative import: leading dots plus an optional path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeModule {
    pub dots: usize,
    pub segments: Vec<Segment>,
}

impl RelativeModule {
    pub fn new(dots: usize) -> Self {
        Self {
            dots,
            segments: Vec::new(),
        }
    }

    pub fn with(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_plain<'a>(mut self, names: impl IntoIterator<Item = &'a String>) -> Self {
        self.segments.extend(names.into_iter().map(Segment::plain));
        self
    }
}

impl fmt::Display for RelativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ".".repeat(self.dots))?;
        let path: Vec<_> = self.segments.iter().map(|s| s.name.as_str()).collect();
        write!(f, "{}", path.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedName {
    pub name: String,
    pub alias: Option<String>,
    pub top_level: bool,
}

impl fmt::Display for EmittedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} as {}", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A statement produced by the rewriter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    From {
        module: RelativeModule,
        names: Vec<EmittedName>,
    },
    /// Statement text emitted as is
    Verbatim(String),
}

impl fmt::Display for Emitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emitted::From { module, names } => {
                let names: Vec<_> = names.iter().map(ToString::to_string).collect();
                write!(f, "from {} import {}", module, names.join(", "))
            }
            Emitted::Verbatim(text) => write!(f, "{text}"),
        }
    }
}
