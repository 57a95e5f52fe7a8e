// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use regex::Regex;

lazy_static::lazy_static! {
    static ref SEQUENCED_RULE_REGEX: Regex =
        Regex::new(r"^\s+\d+\s+(?:permit|deny).+$").unwrap();

    static ref ACL_HEADER_REGEX: Regex = Regex::new(r"^(?:ip access-list.+|!)").unwrap();

    static ref RULE_REGEX: Regex = Regex::new(r"^(?:.+permit\s+.+|.+deny\s+.+)").unwrap();
}

pub const DEFAULT_POSITION_OFFSET: u8 = 5;

pub fn is_acl_config(lines: &[String]) -> bool {
    lines
        .iter()
        .any(|line| line.trim().starts_with("ip access-list"))
}

/// Removes sequence numbers from, and renumbers, access list rules.
#[derive(Debug, Clone, Copy)]
pub struct AclProcessor {
    position_offset: u8,
}

impl Default for AclProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION_OFFSET)
    }
}

impl AclProcessor {
    pub fn new(position_offset: u8) -> Self {
        Self { position_offset }
    }

    /// Strip the sequence numbers from numbered permit/deny rules.
    ///
    /// Example:
    /// ```
    /// use o4n_lib::acl::AclProcessor;
    /// let cleaned = AclProcessor::default().clean_positions(&[
    ///     "ip access-list extended MGMT".to_string(),
    ///     " 10 permit ip any any".to_string(),
    /// ]);
    /// assert_eq!(cleaned, vec!["ip access-list extended MGMT", " permit ip any any"]);
    /// ```
    pub fn clean_positions(&self, lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                if SEQUENCED_RULE_REGEX.is_match(line) {
                    let parts: Vec<&str> = line.split_whitespace().skip(1).collect();
                    format!(" {}", parts.join(" "))
                } else {
                    line.to_string()
                }
            })
            .collect()
    }

    /// Number the missing rules according to their position, relative to
    /// their access list header, in `context`.
    pub fn calculate_positions(&self, missing: &[String], context: &[String]) -> Vec<String> {
        let mut result = vec![];
        let mut current_acl: Option<&str> = None;

        for line in missing {
            if ACL_HEADER_REGEX.is_match(line) {
                current_acl = Some(line.as_str());
                result.push(line.to_string());
            } else if let (true, Some(acl)) = (RULE_REGEX.is_match(line), current_acl) {
                match self.rule_position(acl, line, context) {
                    Some(position) => result.push(format!(" {position} {}", line.trim_start())),
                    None => {
                        log::warn!("cannot locate {line:?} under {acl:?}");
                        result.push(line.to_string())
                    }
                }
            } else {
                result.push(line.to_string());
            }
        }

        result
    }

    fn rule_position(&self, acl: &str, rule: &str, context: &[String]) -> Option<i64> {
        let acl_start = context.iter().position(|l| l == acl)?;
        let rule_pos = context[acl_start..].iter().position(|l| l == rule)?;
        Some(rule_pos as i64 * 10 - self.position_offset as i64)
    }
}
