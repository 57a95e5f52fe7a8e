// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use crate::lines::{is_indented, Lines};
use crate::unified::ChangedLine;

fn has_ignored(line: &str, ignore: &[String]) -> bool {
    ignore.iter().any(|s| !s.is_empty() && line.contains(s.as_str()))
}

/// Rebuild the configuration hierarchy for a set of changed lines.
///
/// Indented lines are preceded by their parent (the nearest unindented line
/// above them in `source`). A parent is only repeated when a different
/// parent has been emitted in between. Lines containing any of the `ignore`
/// strings are skipped.
///
/// Example:
/// ```
/// use o4n_lib::lines::Lines;
/// use o4n_lib::unified::UnifiedDiff;
/// use o4n_lib::blocks::hierarchical_block;
/// let original = Lines::from("interface Gi0/1\n description UPLINK\n no shutdown\n");
/// let current = Lines::from("interface Gi0/1\n description BACKUP\n no shutdown\n");
/// let diff = UnifiedDiff::new(&original, &current, 3);
/// assert_eq!(
///     hierarchical_block(&original, diff.removed(), &[]),
///     Some("interface Gi0/1\n description UPLINK".to_string())
/// );
/// ```
pub fn hierarchical_block(
    source: &Lines,
    changed: &[ChangedLine],
    ignore: &[String],
) -> Option<String> {
    let mut processed: Vec<&str> = vec![];
    let mut current_parent: Option<&str> = None;

    for line in changed.iter().filter(|l| !has_ignored(&l.text, ignore)) {
        if !is_indented(&line.text) {
            if current_parent != Some(line.text.as_str()) {
                processed.push(&line.text);
                current_parent = Some(line.text.as_str());
            }
        } else {
            match source.parent_of(line.source_index) {
                Some(parent) => {
                    if current_parent != Some(parent.as_str()) {
                        processed.push(parent);
                        current_parent = Some(parent.as_str());
                    }
                }
                None => log::debug!("no parent for {:?}", line.text),
            }
            processed.push(&line.text);
        }
    }

    if processed.is_empty() {
        None
    } else {
        Some(processed.join("\n"))
    }
}

#[cfg(test)]
mod blocks_tests {
    use super::*;
    use crate::unified::UnifiedDiff;

    const MASTER: &str = "hostname R1
!
interface Gi0/1
 description UPLINK
 ip address 10.1.1.1 255.255.255.0
 no shutdown
!
interface Gi0/2
 description LAN
 no shutdown
!
";

    const DEVICE: &str = "hostname R1
!
interface Gi0/1
 description BACKUP
 ip address 10.1.1.1 255.255.255.0
 no shutdown
!
interface Gi0/2
 description LAN
 shutdown
! changed by hand
";

    #[test]
    fn blocks_to_add_and_delete() {
        let master = Lines::from(MASTER);
        let device = Lines::from(DEVICE);
        let diff = UnifiedDiff::new(&master, &device, 3);
        let ignore = vec!["!".to_string(), "#".to_string()];
        assert_eq!(
            hierarchical_block(&master, diff.removed(), &ignore),
            Some(
                "interface Gi0/1\n description UPLINK\ninterface Gi0/2\n no shutdown".to_string()
            )
        );
        assert_eq!(
            hierarchical_block(&device, diff.added(), &ignore),
            Some("interface Gi0/1\n description BACKUP\ninterface Gi0/2\n shutdown".to_string())
        );
    }

    #[test]
    fn only_ignored_changes() {
        let master = Lines::from("hostname R1\n!\n");
        let device = Lines::from("hostname R1\n# comment\n");
        let diff = UnifiedDiff::new(&master, &device, 3);
        let ignore = vec!["!".to_string(), "#".to_string()];
        assert_eq!(hierarchical_block(&master, diff.removed(), &ignore), None);
        assert_eq!(hierarchical_block(&device, diff.added(), &ignore), None);
        assert_eq!(
            hierarchical_block(&device, diff.added(), &[]),
            Some("# comment".to_string())
        );
    }

    #[test]
    fn unindented_lines_are_not_repeated() {
        let master = Lines::from("ntp server 1.1.1.1\n");
        let device = Lines::from("ntp server 2.2.2.2\n");
        let diff = UnifiedDiff::new(&master, &device, 3);
        assert_eq!(
            hierarchical_block(&master, diff.removed(), &[]),
            Some("ntp server 1.1.1.1".to_string())
        );
    }
}
