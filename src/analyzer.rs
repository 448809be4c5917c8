//! Directive placement and argument validation.
//!
//! A [`DirectiveTable`] maps directive names to one or more
//! [`DirectiveRule`]s. The [`Analyzer`] checks a statement against
//! those rules given the stack of enclosing block names. Directives
//! the table does not know are accepted unless strict mode is on, and
//! statements inside blocks the table has no context for (`map`,
//! `types`, ...) are never checked.

use std::collections::HashMap;
use std::ops::BitOr;
use std::sync::LazyLock;

use crate::directives;
use crate::ext::Extensions;

/// A block context a directive may appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Main,
    Events,
    Http,
    HttpServer,
    HttpLocation,
    HttpUpstream,
    HttpServerIf,
    HttpLocationIf,
    HttpLimitExcept,
    Stream,
    StreamServer,
    StreamUpstream,
    Mail,
    MailServer,
}

impl Context {
    pub const ALL: [Self; 14] = [
        Self::Main,
        Self::Events,
        Self::Http,
        Self::HttpServer,
        Self::HttpLocation,
        Self::HttpUpstream,
        Self::HttpServerIf,
        Self::HttpLocationIf,
        Self::HttpLimitExcept,
        Self::Stream,
        Self::StreamServer,
        Self::StreamUpstream,
        Self::Mail,
        Self::MailServer,
    ];

    /// The normalized stack of block names this context stands for.
    #[must_use]
    pub const fn path(self) -> &'static [&'static str] {
        match self {
            Self::Main => &[],
            Self::Events => &["events"],
            Self::Http => &["http"],
            Self::HttpServer => &["http", "server"],
            Self::HttpLocation => &["http", "location"],
            Self::HttpUpstream => &["http", "upstream"],
            Self::HttpServerIf => &["http", "server", "if"],
            Self::HttpLocationIf => &["http", "location", "if"],
            Self::HttpLimitExcept => &["http", "location", "limit_except"],
            Self::Stream => &["stream"],
            Self::StreamServer => &["stream", "server"],
            Self::StreamUpstream => &["stream", "upstream"],
            Self::Mail => &["mail"],
            Self::MailServer => &["mail", "server"],
        }
    }

    /// Find the context whose path equals `stack`.
    pub fn from_path<S: AsRef<str>>(stack: &[S]) -> Option<Self> {
        Self::ALL.into_iter().find(|ctx| {
            let path = ctx.path();
            path.len() == stack.len() && path.iter().zip(stack).all(|(a, b)| *a == b.as_ref())
        })
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// A set of [`Context`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contexts(u16);

impl Contexts {
    pub const NONE: Self = Self(0);

    /// Build a set from a list of contexts.
    #[must_use]
    pub const fn of(list: &[Context]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < list.len() {
            bits |= list[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, ctx: Context) -> bool {
        self.0 & ctx.bit() != 0
    }

    /// True if a directive with this context set may appear in
    /// `ctx`. A `limit_except` block accepts every location directive.
    #[must_use]
    pub const fn admits(self, ctx: Context) -> bool {
        match ctx {
            Context::HttpLimitExcept => {
                self.contains(Context::HttpLimitExcept) || self.contains(Context::HttpLocation)
            }
            _ => self.contains(ctx),
        }
    }
}

impl BitOr for Contexts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Accepted argument counts for a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity(u16);

impl Arity {
    pub const NOARGS: Self = Self(1);
    pub const TAKE1: Self = Self(1 << 1);
    pub const TAKE2: Self = Self(1 << 2);
    pub const TAKE3: Self = Self(1 << 3);
    pub const TAKE4: Self = Self(1 << 4);
    pub const TAKE5: Self = Self(1 << 5);
    pub const TAKE6: Self = Self(1 << 6);
    pub const TAKE7: Self = Self(1 << 7);
    /// Exactly one argument, `on` or `off`.
    pub const FLAG: Self = Self(1 << 8);
    pub const ANY: Self = Self(1 << 9);
    pub const ONE_MORE: Self = Self(1 << 10);
    pub const TWO_MORE: Self = Self(1 << 11);

    pub const TAKE12: Self = Self::TAKE1.or(Self::TAKE2);
    pub const TAKE13: Self = Self::TAKE1.or(Self::TAKE3);
    pub const TAKE23: Self = Self::TAKE2.or(Self::TAKE3);
    pub const TAKE123: Self = Self::TAKE12.or(Self::TAKE3);
    pub const TAKE1234: Self = Self::TAKE123.or(Self::TAKE4);

    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    const fn has(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Check `args` against this arity.
    ///
    /// # Errors
    ///
    /// Returns the reason the arguments were rejected.
    pub fn check(self, args: &[String]) -> Result<(), ArgumentsReason> {
        let n = args.len();
        let flag_value = match args {
            [value] if self.has(Self::FLAG) => Some(value),
            _ => None,
        };
        let valid_flag = flag_value.is_some_and(|v| {
            v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("off")
        });

        if (n <= 7 && (self.0 >> n) & 1 == 1)
            || valid_flag
            || self.has(Self::ANY)
            || (self.has(Self::ONE_MORE) && n >= 1)
            || (self.has(Self::TWO_MORE) && n >= 2)
        {
            return Ok(());
        }

        match flag_value {
            Some(value) => Err(ArgumentsReason::Flag(value.clone())),
            None => Err(ArgumentsReason::Count),
        }
    }
}

/// Whether a directive takes a `{ ... }` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRule {
    Required,
    Forbidden,
    Optional,
}

/// One legal shape of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveRule {
    pub contexts: Contexts,
    pub arity: Arity,
    pub block: BlockRule,
}

impl DirectiveRule {
    #[must_use]
    pub const fn new(contexts: Contexts, arity: Arity, block: BlockRule) -> Self {
        Self {
            contexts,
            arity,
            block,
        }
    }

    /// A directive terminated by `;`.
    #[must_use]
    pub const fn leaf(contexts: Contexts, arity: Arity) -> Self {
        Self::new(contexts, arity, BlockRule::Forbidden)
    }

    /// A directive that opens a block.
    #[must_use]
    pub const fn block(contexts: Contexts, arity: Arity) -> Self {
        Self::new(contexts, arity, BlockRule::Required)
    }
}

/// Directive definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DirectiveTable {
    rules: HashMap<String, Vec<DirectiveRule>>,
}

static BUILTIN: LazyLock<DirectiveTable> =
    LazyLock::new(|| DirectiveTable::from_static(directives::BUILTIN));

impl DirectiveTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of core server directives.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Build a table from static data.
    #[must_use]
    pub fn from_static(entries: &[(&str, &[DirectiveRule])]) -> Self {
        let mut table = Self::new();
        for (name, rules) in entries {
            table.insert(name, rules.iter().copied());
        }
        table
    }

    /// Add rules for `name`, keeping any it already has.
    pub fn insert(&mut self, name: &str, rules: impl IntoIterator<Item = DirectiveRule>) {
        self.rules.entry(name.to_string()).or_default().extend(rules);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[DirectiveRule]> {
        self.rules.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Why a directive's arguments or block shape were rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentsReason {
    Count,
    Flag(String),
    MissingBlock,
    UnexpectedBlock,
}

fn arguments_message(directive: &str, reason: &ArgumentsReason) -> String {
    match reason {
        ArgumentsReason::Count => {
            format!("invalid number of arguments in \"{directive}\" directive")
        }
        ArgumentsReason::Flag(value) => format!(
            "invalid value \"{value}\" in \"{directive}\" directive, \
             it must be \"on\" or \"off\""
        ),
        ArgumentsReason::MissingBlock => format!("directive \"{directive}\" has no opening \"{{\""),
        ArgumentsReason::UnexpectedBlock => {
            format!("directive \"{directive}\" is not terminated by \";\"")
        }
    }
}

/// A statement that violates the directive table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// Unknown directive in strict mode.
    #[error("unknown directive \"{directive}\"")]
    Unknown { directive: String },
    /// Directive not allowed in the enclosing context.
    #[error("\"{directive}\" directive is not allowed here")]
    Context { directive: String },
    /// Wrong arguments or block shape.
    #[error("{}", arguments_message(.directive, .reason))]
    Arguments {
        directive: String,
        reason: ArgumentsReason,
    },
}

impl DirectiveError {
    #[must_use]
    pub fn directive(&self) -> &str {
        match self {
            Self::Unknown { directive }
            | Self::Context { directive }
            | Self::Arguments { directive, .. } => directive,
        }
    }
}

/// Validates statements against a directive table.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    table: &'a DirectiveTable,
    extensions: Option<&'a Extensions>,
    pub strict: bool,
    pub check_ctx: bool,
    pub check_args: bool,
}

impl<'a> Analyzer<'a> {
    /// An analyzer with both checks on and strict mode off.
    #[must_use]
    pub const fn new(table: &'a DirectiveTable) -> Self {
        Self {
            table,
            extensions: None,
            strict: false,
            check_ctx: true,
            check_args: true,
        }
    }

    /// Also consult directives registered by `extensions`, which take
    /// precedence over the table.
    #[must_use]
    pub const fn with_extensions(mut self, extensions: &'a Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    fn rules(&self, directive: &str) -> Option<&'a [DirectiveRule]> {
        self.extensions
            .and_then(|exts| exts.rules(directive))
            .or_else(|| self.table.get(directive))
    }

    /// Check one statement. `ctx` is the stack of enclosing block names,
    /// outermost first; `has_block` is whether the statement opened a
    /// block.
    ///
    /// # Errors
    ///
    /// Returns the first rule violation found.
    pub fn analyze<S: AsRef<str>>(
        &self,
        directive: &str,
        args: &[String],
        has_block: bool,
        ctx: &[S],
    ) -> Result<(), DirectiveError> {
        let Some(rules) = self.rules(directive) else {
            if self.strict {
                return Err(DirectiveError::Unknown {
                    directive: directive.to_string(),
                });
            }
            return Ok(());
        };

        let Some(context) = Context::from_path(ctx) else {
            return Ok(());
        };

        let candidates: Vec<&DirectiveRule> = if self.check_ctx {
            rules.iter().filter(|r| r.contexts.admits(context)).collect()
        } else {
            rules.iter().collect()
        };
        if candidates.is_empty() {
            return Err(DirectiveError::Context {
                directive: directive.to_string(),
            });
        }

        if !self.check_args {
            return Ok(());
        }

        // rules listed first are the most common shape, so report
        // the reason from the first one that failed
        let mut reason = ArgumentsReason::Count;
        for rule in candidates.iter().rev() {
            match (rule.block, has_block) {
                (BlockRule::Required, false) => reason = ArgumentsReason::MissingBlock,
                (BlockRule::Forbidden, true) => reason = ArgumentsReason::UnexpectedBlock,
                _ => match rule.arity.check(args) {
                    Ok(()) => return Ok(()),
                    Err(r) => reason = r,
                },
            }
        }

        Err(DirectiveError::Arguments {
            directive: directive.to_string(),
            reason,
        })
    }
}
