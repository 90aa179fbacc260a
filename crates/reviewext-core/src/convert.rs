//! Legacy syntax converter
//!
//! Rewrites older Re:VIEW markup to the current directive set. Rules run
//! in a fixed order over the whole source, so later rules see the output
//! of earlier ones; in particular the extended `//list` option pass also
//! processes blocks produced from `emlist`, `cmd` and `source`.
//!
//! | Rule | From | To |
//! |---|---|---|
//! | bold | `@<B>{x}` | `@<strong>{x}` |
//! | nop | `@<nop>{x}` | `{{{x}}}` |
//! | term | `@<term>{a,b}` | `@<term>{a\|b}` |
//! | abstract | `//abstract{ .. //}` | `//lead{ .. //}` |
//! | vspace | `//vspace[n]` | `//note[版面調整:vspace=n]` |
//! | sideimage | `//sideimage[a][b]` | `//image[a][b]` + note |
//! | emlist | `//emlist[cap][opts]` | `//list[][cap][opts]` |
//! | cmd | `//cmd[cap]` | `//list[][cap][fontsize=small]` |
//! | source | `//source[file][cap]` | `//list[][cap][filename=file]` |

use std::sync::OnceLock;

use regex::{Captures, Regex};
use reviewext_ast::{DirectiveKind, DEFAULT_FOLD_MARK};
use serde::Serialize;
use tracing::debug;

use crate::config::ListingSettings;
use crate::error::ConvertError;
use crate::options::{leading_int, looks_like_options, OptionList};
use crate::wrap::{LineWrapper, WrapPolicy};

/// Caption given to converted `//cmd` blocks without one
pub const DEFAULT_CMD_CAPTION: &str = "コマンド";

/// Continuation indent used when pre-wrapping `wrap=<n>` bodies
pub const PREWRAP_INDENT: usize = 2;

/// Flags that are normalized to `key=on` when written bare
const BARE_FLAGS: [&str; 6] = [
    "lineno",
    "fold",
    "widecharfit",
    "copybutton",
    "foldable",
    "anchorlinks",
];

/// Extended `//list` options understood by the converter, for help output
pub const EXTENDED_OPTIONS: [(&str, &str); 11] = [
    ("captionpos=top|bottom|none", "Caption position"),
    ("filename=<name>", "Show filename badge"),
    ("highlight=1,3-5", "Highlight lines"),
    ("lineno=on|off|<number>", "Line numbers"),
    ("fontsize=<size>", "Font size"),
    ("diffformat=inline|side", "Diff display format"),
    ("copybutton=on|off", "Copy button (HTML)"),
    ("foldable=on|off", "Foldable code (HTML)"),
    ("indent=<width>", "Indent guides"),
    ("widecharfit=on|off", "Wide character fitting"),
    ("lang=<language>", "Syntax highlighting language"),
];

/// A conversion rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConvertRule {
    pub name: &'static str,
    pub description: &'static str,
}

/// Conversion rules in application order
pub const RULES: [ConvertRule; 12] = [
    ConvertRule {
        name: "B to strong",
        description: "Convert @<B> to @<strong>",
    },
    ConvertRule {
        name: "nop literal",
        description: "Convert @<nop> to literal brackets",
    },
    ConvertRule {
        name: "term comma to pipe",
        description: "Unify term tag delimiter from comma to pipe",
    },
    ConvertRule {
        name: "abstract to lead",
        description: "Convert //abstract to //lead",
    },
    ConvertRule {
        name: "vspace to note",
        description: "Convert //vspace to note directive",
    },
    ConvertRule {
        name: "needvspace to note",
        description: "Convert //needvspace to note directive",
    },
    ConvertRule {
        name: "sideimage to image+note",
        description: "Convert //sideimage to //image with note",
    },
    ConvertRule {
        name: "emlist to list",
        description: "Convert //emlist to //list",
    },
    ConvertRule {
        name: "emlistnum to list",
        description: "Convert //emlistnum to //list with lineno",
    },
    ConvertRule {
        name: "cmd to list",
        description: "Convert //cmd to //list",
    },
    ConvertRule {
        name: "source to list",
        description: "Convert //source to //list",
    },
    ConvertRule {
        name: "list with extended options",
        description: "Process extended list options",
    },
];

/// Replacement count for one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub rule: &'static str,
    pub count: usize,
}

/// Result of converting one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub output: String,
    /// One entry per rule, in rule order
    pub counts: Vec<RuleCount>,
}

impl Conversion {
    /// Total replacements across all rules
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn changed(&self) -> bool {
        self.total() > 0
    }
}

/// Applies the conversion rules
#[derive(Debug, Clone)]
pub struct Converter {
    fold_mark: String,
    policy: WrapPolicy,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            fold_mark: DEFAULT_FOLD_MARK.to_string(),
            policy: WrapPolicy::default(),
        }
    }
}

impl Converter {
    pub fn new(settings: &ListingSettings) -> Self {
        Self {
            fold_mark: settings.fold_mark.clone(),
            policy: settings.wrap_policy,
        }
    }

    /// Convert one source
    ///
    /// # Example
    ///
    /// ```
    /// use reviewext_core::convert::Converter;
    ///
    /// let conversion = Converter::default()
    ///     .convert("//cmd[Build]{\n$ make\n//}\n")
    ///     .unwrap();
    /// assert_eq!(conversion.output, "//list[][Build][fontsize=small]{\n$ make\n//}\n");
    /// ```
    pub fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let mut text = source.to_string();
        let mut counts = Vec::with_capacity(RULES.len());

        for (index, rule) in RULES.iter().enumerate() {
            let (next, count) = self.apply(index, &text)?;
            if count > 0 {
                debug!(rule = rule.name, count, "applied conversion rule");
            }
            counts.push(RuleCount {
                rule: rule.name,
                count,
            });
            text = next;
        }

        Ok(Conversion {
            output: text,
            counts,
        })
    }

    fn apply(&self, index: usize, text: &str) -> Result<(String, usize), ConvertError> {
        let re = &rule_patterns()[index];
        match index {
            0 => replace_counted(re, text, |c| Ok(format!("@<strong>{{{}}}", &c[1]))),
            1 => replace_counted(re, text, |c| Ok(format!("{{{{{{{}}}}}}}", &c[1]))),
            2 => replace_counted(re, text, |c| Ok(format!("@<term>{{{}|{}}}", &c[1], &c[2]))),
            3 => replace_counted(re, text, |c| Ok(format!("//lead{{{}//}}", &c[1]))),
            4 => replace_counted(re, text, |c| Ok(format!("//note[版面調整:vspace={}]", &c[1]))),
            5 => replace_counted(re, text, |c| {
                Ok(format!("//note[版面調整:needvspace={}]", &c[1]))
            }),
            6 => replace_counted(re, text, |c| {
                Ok(format!(
                    "//image[{}][{}]\n//note[サイド注記:横組はスタイルで調整]",
                    &c[1], &c[2]
                ))
            }),
            7 => self.replace_legacy(re, text, DirectiveKind::EmList),
            8 => self.replace_legacy(re, text, DirectiveKind::EmListNum),
            9 => self.replace_legacy(re, text, DirectiveKind::Cmd),
            10 => self.replace_legacy(re, text, DirectiveKind::Source),
            _ => replace_counted(re, text, |c| {
                self.extended_list(&c[1], &c[2], &c[3], &c[4])
            }),
        }
    }

    fn replace_legacy(
        &self,
        re: &Regex,
        text: &str,
        kind: DirectiveKind,
    ) -> Result<(String, usize), ConvertError> {
        replace_counted(re, text, |c| {
            let first = c.get(1).map(|m| m.as_str());
            let second = c.get(2).map(|m| m.as_str());
            let header = modern_header(kind, first, second).unwrap_or_default();
            Ok(format!("{}{{{}//}}", header, &c[3]))
        })
    }

    /// Normalize the options of a `//list[label][caption][options]` block
    fn extended_list(
        &self,
        label: &str,
        caption: &str,
        options: &str,
        body: &str,
    ) -> Result<String, ConvertError> {
        let mut opts = OptionList::parse(options);
        for flag in BARE_FLAGS {
            if opts.get(flag) == Some(None) {
                opts.set(flag, Some("on".to_string()));
            }
        }

        let caption = if opts.get("captionpos") == Some(Some("none")) {
            ""
        } else {
            caption
        };

        let mut annotations = Vec::new();
        if let Some(Some(diff)) = opts.get("diffformat") {
            if diff != "none" {
                annotations.push(format!("#@# diffformat: {}", diff));
            }
        }
        if let Some(Some(ranges)) = opts.get("highlight") {
            annotations.push(format!("#@# highlight: {}", ranges));
        }
        if let Some(Some(filename)) = opts.get("filename") {
            annotations.push(format!("#@# filename: {}", filename));
        }

        let fold = opts.get("fold");
        let wrap = opts.get("wrap");
        if fold != Some(Some("off"))
            && (is_on(fold) || is_on(wrap))
            && opts.get("foldmark").flatten().is_none()
        {
            opts.set("foldmark", Some(self.fold_mark.clone()));
        }

        let mut body = body.to_string();
        if let Some(Some(value)) = opts.get("wrap") {
            if value != "on" && value != "off" {
                if let Some(width) = leading_int(value).filter(|w| *w > 0) {
                    let mark = opts
                        .get("foldmark")
                        .flatten()
                        .unwrap_or(self.fold_mark.as_str())
                        .to_string();
                    body = self.prewrap(label, &body, width as usize, &mark)?;
                }
            }
        }

        if !annotations.is_empty() {
            let (lead, rest) = match body.strip_prefix('\n') {
                Some(rest) => ("\n", rest),
                None => ("", body.as_str()),
            };
            body = format!("{}{}\n{}", lead, annotations.join("\n"), rest);
        }

        Ok(format!(
            "{}{{{}//}}",
            list_header(label, caption, &opts.to_string()),
            body
        ))
    }

    fn prewrap(
        &self,
        label: &str,
        body: &str,
        width: usize,
        mark: &str,
    ) -> Result<String, ConvertError> {
        let wrapper = LineWrapper::new(width, PREWRAP_INDENT, mark)
            .map_err(|source| ConvertError::Wrap {
                label: label.to_string(),
                source,
            })?
            .with_policy(self.policy);

        let lines: Vec<&str> = body.split('\n').collect();
        Ok(wrapper.wrap_lines(&lines).join("\n"))
    }
}

/// `//list[label][caption][options]`, omitting empty options
pub fn list_header(label: &str, caption: &str, options: &str) -> String {
    if options.is_empty() {
        format!("//list[{}][{}]", label, caption)
    } else {
        format!("//list[{}][{}][{}]", label, caption, options)
    }
}

/// The `//list` header replacing a deprecated directive header
///
/// `first` and `second` are the directive's bracket parameters in source
/// order. Returns `None` for directives that are not deprecated.
pub fn modern_header(
    kind: DirectiveKind,
    first: Option<&str>,
    second: Option<&str>,
) -> Option<String> {
    let first = first.unwrap_or_default();
    let second = second.unwrap_or_default();

    let header = match kind {
        DirectiveKind::EmList => list_header("", first, second),
        DirectiveKind::EmListNum => {
            let mut opts = as_option_list(second);
            if !opts.contains("lineno") {
                opts.set("lineno", Some("on".to_string()));
            }
            list_header("", first, &opts.to_string())
        }
        DirectiveKind::Cmd => {
            let caption = if first.is_empty() {
                DEFAULT_CMD_CAPTION
            } else {
                first
            };
            let mut opts = as_option_list(second);
            if !opts.contains("fontsize") {
                opts.set("fontsize", Some("small".to_string()));
            }
            list_header("", caption, &opts.to_string())
        }
        DirectiveKind::Source => {
            let mut opts = OptionList::new();
            if !first.is_empty() {
                opts.set("filename", Some(first.to_string()));
            }
            list_header("", second, &opts.to_string())
        }
        DirectiveKind::List | DirectiveKind::ListNum => return None,
    };
    Some(header)
}

/// Treat a plain language tag as `lang=<tag>`
fn as_option_list(param: &str) -> OptionList {
    let param = param.trim();
    if param.is_empty() || looks_like_options(param) {
        OptionList::parse(param)
    } else {
        let mut opts = OptionList::new();
        opts.set("lang", Some(param.to_string()));
        opts
    }
}

fn is_on(value: Option<Option<&str>>) -> bool {
    matches!(value, Some(None) | Some(Some("on")))
}

fn rule_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"@<B>\{([^}]*)\}",
            r"@<nop>\{([^}]*)\}",
            r"@<term>\{([^,{}]+),([^{}]+)\}",
            r"(?m)^//abstract\{([\s\S]*?)^//\}",
            r"(?m)^//vspace\[([+-]?\d+)\][ \t]*$",
            r"(?m)^//needvspace\[([+-]?\d+)\][ \t]*$",
            r"(?m)^//sideimage\[([^\]]*)\]\[([^\]]*)\][ \t]*$",
            r"(?m)^//emlist(?:\[([^\]]*)\])?(?:\[([^\]]*)\])?\{([\s\S]*?)^//\}",
            r"(?m)^//emlistnum(?:\[([^\]]*)\])?(?:\[([^\]]*)\])?\{([\s\S]*?)^//\}",
            r"(?m)^//cmd(?:\[([^\]]*)\])?(?:\[([^\]]*)\])?\{([\s\S]*?)^//\}",
            r"(?m)^//source(?:\[([^\]]*)\])?(?:\[([^\]]*)\])?\{([\s\S]*?)^//\}",
            r"(?m)^//list\[([^\]]*)\]\[([^\]]*)\]\[([^\]]*)\]\{([\s\S]*?)^//\}",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    })
}

/// Replace every match, counting the matches whose text actually changed
fn replace_counted<F>(re: &Regex, input: &str, mut rewrite: F) -> Result<(String, usize), ConvertError>
where
    F: FnMut(&Captures<'_>) -> Result<String, ConvertError>,
{
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    let mut count = 0;

    for caps in re.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let replacement = rewrite(&caps)?;
        if replacement != whole.as_str() {
            count += 1;
        }
        out.push_str(&input[last..whole.start()]);
        out.push_str(&replacement);
        last = whole.end();
    }
    out.push_str(&input[last..]);

    Ok((out, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(source: &str) -> Conversion {
        Converter::default().convert(source).unwrap()
    }

    fn count(conversion: &Conversion, rule: &str) -> usize {
        conversion
            .counts
            .iter()
            .find(|c| c.rule == rule)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    #[test]
    fn test_inline_tags() {
        let out = convert("@<B>{bold} and @<nop>{@<b>} and @<term>{API,Application}");
        assert_eq!(
            out.output,
            "@<strong>{bold} and {{{@<b>}}} and @<term>{API|Application}"
        );
        assert_eq!(count(&out, "B to strong"), 1);
        assert_eq!(count(&out, "term comma to pipe"), 1);
    }

    #[test]
    fn test_block_tags() {
        let source = "//abstract{\nSummary.\n//}\n//vspace[-2]\n//needvspace[10]\n//sideimage[img][20mm]\n";
        let out = convert(source);
        assert_eq!(
            out.output,
            "//lead{\nSummary.\n//}\n//note[版面調整:vspace=-2]\n//note[版面調整:needvspace=10]\n//image[img][20mm]\n//note[サイド注記:横組はスタイルで調整]\n"
        );
    }

    #[test]
    fn test_emlist_to_list() {
        let out = convert("//emlist[Output][ruby]{\nputs 1\n//}\n");
        assert_eq!(out.output, "//list[][Output][ruby]{\nputs 1\n//}\n");
        assert_eq!(count(&out, "emlist to list"), 1);
    }

    #[test]
    fn test_emlistnum_adds_lineno() {
        let out = convert("//emlistnum[Numbered][ruby]{\nputs 1\n//}\n");
        assert_eq!(out.output, "//list[][Numbered][lang=ruby,lineno]{\nputs 1\n//}\n");
    }

    #[test]
    fn test_cmd_default_caption() {
        let out = convert("//cmd{\n$ ls\n//}\n");
        assert_eq!(out.output, "//list[][コマンド][fontsize=small]{\n$ ls\n//}\n");
    }

    #[test]
    fn test_source_to_filename() {
        let out = convert("//source[lib/app.rb][App]{\nclass App; end\n//}\n");
        assert_eq!(
            out.output,
            "//list[][App][filename=lib/app.rb]{\n#@# filename: lib/app.rb\nclass App; end\n//}\n"
        );
        assert_eq!(count(&out, "source to list"), 1);
        assert_eq!(count(&out, "list with extended options"), 1);
    }

    #[test]
    fn test_extended_options() {
        let source = "//list[a][Cap][captionpos=none,highlight=2-3,diffformat=inline,fold]{\nx\n//}\n";
        let out = convert(source);
        assert_eq!(
            out.output,
            "//list[a][][captionpos=none,highlight=2-3,diffformat=inline,fold,foldmark=\u{21a9}]{\n#@# diffformat: inline\n#@# highlight: 2-3\nx\n//}\n"
        );
    }

    #[test]
    fn test_fold_off_keeps_no_mark() {
        let out = convert("//list[a][b][wrap,fold=off]{\nx\n//}\n");
        assert_eq!(out.output, "//list[a][b][wrap,fold=off]{\nx\n//}\n");
        assert_eq!(count(&out, "list with extended options"), 0);
    }

    #[test]
    fn test_explicit_width_prewraps() {
        let source = format!("//list[a][b][wrap=10]{{\n{}\n//}}\n", "z".repeat(14));
        let out = convert(&source);
        assert_eq!(
            out.output,
            format!(
                "//list[a][b][wrap=10]{{\n{}\u{21a9}\n  {}\n//}}\n",
                "z".repeat(10),
                "z".repeat(4)
            )
        );
    }

    #[test]
    fn test_prewrap_error() {
        let err = Converter::default()
            .convert("//list[tiny][b][wrap=2]{\nabcdef\n//}\n")
            .unwrap_err();
        assert!(matches!(err, ConvertError::Wrap { ref label, .. } if label == "tiny"));
    }

    #[test]
    fn test_unchanged_source() {
        let source = "= Title\n\n//list[a][b]{\nx\n//}\n";
        let out = convert(source);
        assert_eq!(out.output, source);
        assert!(!out.changed());
        assert_eq!(out.counts.len(), RULES.len());
    }

    #[test]
    fn test_modern_header() {
        assert_eq!(
            modern_header(DirectiveKind::Cmd, Some("Run"), Some("lang=sh")).as_deref(),
            Some("//list[][Run][lang=sh,fontsize=small]")
        );
        assert_eq!(
            modern_header(DirectiveKind::EmList, None, None).as_deref(),
            Some("//list[][]")
        );
        assert_eq!(modern_header(DirectiveKind::List, None, None), None);
    }
}
