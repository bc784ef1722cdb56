//! Rendering of the static operator page.

use crate::gpu::GpuOperations;

const TEMPLATE: &str = include_str!("../static/index.html");
const OPTIONS_PLACEHOLDER: &str = "{{INSTANCE_OPTIONS}}";

/// Render the page with one `<option>` per configured instance.
pub fn render_index(gpu: &GpuOperations) -> String {
    let options = gpu
        .range()
        .iter()
        .map(|id| {
            format!(
                "    <option value=\"{}\">{}</option>",
                id,
                escape_html(&gpu.container_name(id))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    TEMPLATE.replace(OPTIONS_PLACEHOLDER, &options)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandsConfig, InstancesConfig};
    use crate::test_util::RecordingRunner;
    use std::sync::Arc;

    fn gpu(from: u32, to: u32, prefix: &str) -> GpuOperations {
        let instances = InstancesConfig {
            from,
            to,
            container_prefix: prefix.to_string(),
        };
        GpuOperations::new(
            &instances,
            &CommandsConfig::default(),
            Arc::new(RecordingRunner::with_stdout("")),
        )
        .unwrap()
    }

    #[test]
    fn test_lists_every_instance() {
        let page = render_index(&gpu(1, 4, "hufs0"));
        for n in 1..=4 {
            assert!(page.contains(&format!("<option value=\"{n}\">hufs0{n}</option>")));
        }
        assert!(!page.contains("value=\"5\""));
        assert!(!page.contains(OPTIONS_PLACEHOLDER));
    }

    #[test]
    fn test_labels_are_escaped() {
        let page = render_index(&gpu(2, 2, "<gpu>"));
        assert!(page.contains("<option value=\"2\">&lt;gpu&gt;2</option>"));
    }
}
