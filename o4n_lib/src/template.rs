// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Hierarchical comparison of a configuration template with a device
//! configuration. Template lines may contain `{{ NAME }}` variables which
//! match any non empty text.

use regex::Regex;

use crate::error::Result;
use crate::lines::is_indented;

lazy_static::lazy_static! {
    pub static ref TEMPLATE_VAR_REGEX: Regex = Regex::new(r"\{\{\s*.*?\s*\}\}").unwrap();
}

pub fn has_template_var(line: &str) -> bool {
    TEMPLATE_VAR_REGEX.is_match(line)
}

#[derive(Debug)]
pub enum LinePattern {
    Literal(String),
    Template(Regex),
}

impl LinePattern {
    /// Example:
    /// ```
    /// use o4n_lib::template::LinePattern;
    /// let pattern = LinePattern::new(" ip address {{ IP }} {{MASK}}").unwrap();
    /// assert!(pattern.matches("  ip address 10.0.0.1 255.0.0.0"));
    /// assert!(!pattern.matches(" ip address 10.0.0.1"));
    /// assert!(LinePattern::new("no shutdown").unwrap().matches(" no shutdown "));
    /// ```
    pub fn new(line: &str) -> Result<Self> {
        let line = line.trim();
        if has_template_var(line) {
            let mut pattern = String::from("^");
            let mut last = 0;
            for var in TEMPLATE_VAR_REGEX.find_iter(line) {
                pattern.push_str(&regex::escape(&line[last..var.start()]));
                pattern.push_str("(.+)");
                last = var.end();
            }
            pattern.push_str(&regex::escape(&line[last..]));
            pattern.push('$');
            Ok(Self::Template(Regex::new(&pattern)?))
        } else {
            Ok(Self::Literal(line.to_string()))
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        let line = line.trim();
        match self {
            Self::Literal(literal) => literal == line,
            Self::Template(regex) => regex.is_match(line),
        }
    }
}

/// A top level line and the indented lines that follow it
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigGroup {
    pub parent: String,
    pub children: Vec<String>,
}

impl ConfigGroup {
    fn lines(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.parent).chain(self.children.iter())
    }
}

/// Split configuration lines into groups. Blank lines and comment ("!")
/// lines are discarded.
///
/// Example:
/// ```
/// use o4n_lib::template::{config_groups, ConfigGroup};
/// let lines: Vec<String> = ["hostname R1", "!", "interface Gi0/1", " no shutdown", ""]
///     .iter().map(|s| s.to_string()).collect();
/// let groups = config_groups(&lines);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[1], ConfigGroup {
///     parent: "interface Gi0/1".to_string(),
///     children: vec![" no shutdown".to_string()],
/// });
/// ```
pub fn config_groups(lines: &[String]) -> Vec<ConfigGroup> {
    let mut groups: Vec<ConfigGroup> = vec![];
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('!') {
            continue;
        }
        match groups.last_mut() {
            Some(group) if is_indented(line) => group.children.push(line.to_string()),
            _ => groups.push(ConfigGroup {
                parent: line.to_string(),
                children: vec![],
            }),
        }
    }
    groups
}

struct PatternGroup {
    parent: LinePattern,
    children: Vec<LinePattern>,
}

impl PatternGroup {
    fn new(group: &ConfigGroup) -> Result<Self> {
        Ok(Self {
            parent: LinePattern::new(&group.parent)?,
            children: group
                .children
                .iter()
                .map(|child| LinePattern::new(child))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn missing_children<'a>(&self, template: &'a ConfigGroup, group: &ConfigGroup) -> Vec<&'a String> {
        template
            .children
            .iter()
            .zip(self.children.iter())
            .filter(|(_, pattern)| !group.children.iter().any(|child| pattern.matches(child)))
            .map(|(line, _)| line)
            .collect()
    }

    fn additional_children<'a>(&self, group: &'a ConfigGroup) -> Vec<&'a String> {
        group
            .children
            .iter()
            .filter(|child| !self.children.iter().any(|pattern| pattern.matches(child)))
            .collect()
    }
}

/// The result of comparing a (template) baseline with a comparison config.
#[derive(Debug, Default)]
pub struct TemplateComparison {
    missing: Vec<Vec<String>>,
    additional: Vec<Vec<String>>,
}

impl TemplateComparison {
    pub fn new(baseline: &[String], comparison: &[String]) -> Result<Self> {
        let baseline_groups = config_groups(baseline);
        let comparison_groups = config_groups(comparison);
        let patterns = baseline_groups
            .iter()
            .map(PatternGroup::new)
            .collect::<Result<Vec<_>>>()?;

        let mut missing = vec![];
        for (template, pattern) in baseline_groups.iter().zip(patterns.iter()) {
            // where several groups match a templated parent use the best fit
            let best = comparison_groups
                .iter()
                .filter(|group| pattern.parent.matches(&group.parent))
                .map(|group| pattern.missing_children(template, group))
                .min_by_key(|lines| lines.len());
            match best {
                None => missing.push(template.lines().cloned().collect()),
                Some(children) if !children.is_empty() => {
                    let mut lines = vec![template.parent.clone()];
                    lines.extend(children.into_iter().cloned());
                    missing.push(lines);
                }
                Some(_) => (),
            }
        }

        let mut additional = vec![];
        for group in comparison_groups.iter() {
            let best = patterns
                .iter()
                .filter(|pattern| pattern.parent.matches(&group.parent))
                .map(|pattern| pattern.additional_children(group))
                .min_by_key(|lines| lines.len());
            match best {
                None => additional.push(group.lines().cloned().collect()),
                Some(children) if !children.is_empty() => {
                    let mut lines = vec![group.parent.clone()];
                    lines.extend(children.into_iter().cloned());
                    additional.push(lines);
                }
                Some(_) => (),
            }
        }
        log::debug!(
            "template comparison: {} missing groups, {} additional groups",
            missing.len(),
            additional.len()
        );

        Ok(Self {
            missing,
            additional,
        })
    }

    /// Groups of lines in the baseline but not in the comparison
    pub fn missing(&self) -> &[Vec<String>] {
        &self.missing
    }

    /// Groups of lines in the comparison but not in the baseline
    pub fn additional(&self) -> &[Vec<String>] {
        &self.additional
    }

    pub fn missing_lines(&self) -> Vec<String> {
        self.missing.iter().flatten().cloned().collect()
    }

    /// The additional groups one line each, with a blank line between groups
    pub fn additional_lines(&self) -> Vec<String> {
        let mut lines = vec![];
        for (index, group) in self.additional.iter().enumerate() {
            if index > 0 {
                lines.push(String::new());
            }
            lines.extend(group.iter().cloned());
        }
        lines
    }

    pub fn delta(&self) -> String {
        let mut delta = String::from("--- baseline\n+++ comparison\n\n");
        for (prefix, groups) in [('-', &self.missing), ('+', &self.additional)] {
            for group in groups {
                for line in group {
                    delta.push(prefix);
                    delta.push_str(line);
                    delta.push('\n');
                }
                delta.push('\n');
            }
        }
        delta
    }
}

#[cfg(test)]
mod template_tests {
    use super::*;

    fn strings(text: &str) -> Vec<String> {
        text.lines().map(|s| s.to_string()).collect()
    }

    const TEMPLATE: &str = "interface {{ INTERFACE }}
 description {{ DESC }}
 ip address {{ IP_ADDRESS }} {{ MASK }}
 no ip proxy-arp
 no shutdown";

    #[test]
    fn template_matches_device() {
        let device = strings(
            "hostname R1
!
interface GigabitEthernet0/1
 description UPLINK
 ip address 10.1.1.1 255.255.255.0
 no ip proxy-arp
 no shutdown
!",
        );
        let comparison = TemplateComparison::new(&strings(TEMPLATE), &device).unwrap();
        assert!(comparison.missing().is_empty());
        assert_eq!(comparison.additional_lines(), vec!["hostname R1"]);
        assert_eq!(
            comparison.delta(),
            "--- baseline\n+++ comparison\n\n+hostname R1\n\n"
        );
    }

    #[test]
    fn additional_groups_are_separated() {
        let device = strings(
            "hostname R1
interface GigabitEthernet0/1
 description UPLINK
 ip address 10.1.1.1 255.255.255.0
 no ip proxy-arp
 no shutdown
 speed 100
ntp server 1.1.1.1",
        );
        let comparison = TemplateComparison::new(&strings(TEMPLATE), &device).unwrap();
        assert_eq!(
            comparison.additional_lines(),
            vec![
                "hostname R1",
                "",
                "interface GigabitEthernet0/1",
                " speed 100",
                "",
                "ntp server 1.1.1.1"
            ]
        );
    }

    #[test]
    fn best_fitting_group_is_used() {
        let device = strings(
            "interface GigabitEthernet0/1
 description A
 shutdown
interface GigabitEthernet0/2
 description B
 ip address 10.0.0.1 255.0.0.0
 no shutdown",
        );
        let comparison = TemplateComparison::new(&strings(TEMPLATE), &device).unwrap();
        assert_eq!(
            comparison.missing(),
            &[vec![
                "interface {{ INTERFACE }}".to_string(),
                " no ip proxy-arp".to_string()
            ]]
        );
        assert_eq!(
            comparison.additional_lines(),
            vec!["interface GigabitEthernet0/1", " shutdown"]
        );
    }

    #[test]
    fn missing_parent_means_missing_group() {
        let template = strings("router ospf 1\n network 10.0.0.0 0.255.255.255 area 0");
        let device = strings("router bgp 65000\n neighbor 1.1.1.1 remote-as 65001");
        let comparison = TemplateComparison::new(&template, &device).unwrap();
        assert_eq!(comparison.missing_lines(), template);
        assert_eq!(comparison.additional_lines(), device);
    }

    #[test]
    fn orphan_children_form_groups() {
        let groups = config_groups(&strings(" orphan\nparent\n child"));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].parent, " orphan");
        assert_eq!(groups[1].children, vec![" child"]);
    }
}
