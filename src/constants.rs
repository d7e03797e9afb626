//! Constants for the `jst` application.

use nu_ansi_term::Color;

/// Name of the user configuration file, relative to the home directory.
pub(crate) const JST_CFG_FILE_NAME: &str = ".jst.toml";

/// Number of leading `change_id` characters embedded in a branch name.
pub(crate) const CHANGE_ID_SUFFIX_LEN: usize = 12;

/// Maximum number of words kept in a branch slug.
pub(crate) const SLUG_MAX_WORDS: usize = 5;

/// Slug used when a title has no characters a branch name may carry.
pub(crate) const FALLBACK_SLUG: &str = "change";

/// Separator between a pull request description and the stack block.
pub(crate) const STACK_BLOCK_SEPARATOR: &str = "---";

pub(crate) const DEFAULT_REMOTE: &str = "origin";
pub(crate) const DEFAULT_BASELINE: &str = "trunk()";
pub(crate) const DEFAULT_HEAD: &str = "@";

pub(crate) const COLORS: [Color; 6] = [
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Purple,
];

pub(crate) const FILLED_CIRCLE: char = '●';
pub(crate) const EMPTY_CIRCLE: char = '○';
pub(crate) const VERTICAL_BOX: char = '│';
pub(crate) const DIAMOND: char = '◆';
