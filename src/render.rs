use crate::models::Event;

/// Render the final selection as day-grouped newsletter HTML.
///
/// Events are sorted by start ascending; a bold day heading opens a new
/// `<ul>` whenever the calendar day changes relative to the previous emitted
/// item. Items link their title when a URL is present. The output is
/// idempotent for a fixed input order.
pub fn render(events: &[Event]) -> String {
    let mut events: Vec<&Event> = events.iter().collect();
    events.sort_by_key(|event| event.start);

    let mut output = String::new();
    let mut current_day = String::new();

    for event in events {
        let title = event.title.trim();
        if title.is_empty() {
            continue;
        }
        let day = event.start.format("%A, %B %d").to_string();
        let time = format_time(event);
        let location = event.location.trim();

        if day != current_day {
            if !current_day.is_empty() {
                output.push_str("</ul>\n");
            }
            output.push_str(&format!("<b>{day}</b>\n<ul>"));
            current_day = day;
        }

        let url = event.url.trim();
        if url.is_empty() {
            output.push_str(&format!(
                "<li>{}<br>{time}, {}</li>\n",
                escape(title),
                escape(location)
            ));
        } else {
            output.push_str(&format!(
                "<li><a href=\"{}\">{}</a><br>{time}, {}</li>\n",
                escape(url),
                escape(title),
                escape(location)
            ));
        }
    }

    if !output.ends_with("</ul>") && !output.is_empty() {
        output.push_str("</ul>");
    }

    output.trim().to_string()
}

// 12-hour clock, no leading zero, uppercase AM/PM.
pub(crate) fn format_time(event: &Event) -> String {
    let formatted = event.start.format("%I:%M %p").to_string();
    formatted
        .strip_prefix('0')
        .map(str::to_string)
        .unwrap_or(formatted)
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn event(title: &str, start: &str, location: &str, url: &str) -> Event {
        Event {
            source: String::new(),
            title: title.to_string(),
            start: DateTime::parse_from_rfc3339(start).expect("valid start"),
            location: location.to_string(),
            url: url.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn renders_an_unlinked_item_with_heading_and_time() {
        let output = render(&[event(
            "Gala",
            "2025-05-15T19:00:00-04:00",
            "Indianapolis",
            "",
        )]);
        assert_eq!(
            output,
            "<b>Thursday, May 15</b>\n<ul><li>Gala<br>7:00 PM, Indianapolis</li>\n</ul>"
        );
    }

    #[test]
    fn linked_items_wrap_the_title_in_an_anchor() {
        let output = render(&[event(
            "Chapel Service",
            "2025-05-15T09:00:00-04:00",
            "Indianapolis",
            "https://connect.marian.edu/x",
        )]);
        assert!(output.contains(
            "<li><a href=\"https://connect.marian.edu/x\">Chapel Service</a><br>9:00 AM, Indianapolis</li>"
        ));
    }

    #[test]
    fn two_days_produce_two_headings_in_order() {
        let output = render(&[
            event("Gala", "2025-05-15T19:00:00-04:00", "Indianapolis", ""),
            event("Brunch", "2025-05-16T10:30:00-04:00", "Indianapolis", ""),
            event("Chapel", "2025-05-15T09:00:00-04:00", "Indianapolis", ""),
        ]);
        let first = output.find("<b>Thursday, May 15</b>").expect("first day");
        let second = output.find("<b>Friday, May 16</b>").expect("second day");
        assert!(first < second);
        assert_eq!(output.matches("<b>").count(), 2);
        assert_eq!(output.matches("</ul>").count(), 2);
        // Sorting puts the chapel before the gala inside the first group.
        assert!(output.find("Chapel").expect("chapel") < output.find("Gala").expect("gala"));
    }

    #[test]
    fn render_is_idempotent_over_permutations() {
        let a = event("Gala", "2025-05-15T19:00:00-04:00", "Indianapolis", "");
        let b = event("Brunch", "2025-05-16T10:30:00-04:00", "Indianapolis", "");
        let c = event("Chapel", "2025-05-15T09:00:00-04:00", "Indianapolis", "");

        let reference = render(&[a.clone(), b.clone(), c.clone()]);
        for permutation in [
            vec![c.clone(), b.clone(), a.clone()],
            vec![b.clone(), a.clone(), c.clone()],
            vec![c, a, b],
        ] {
            assert_eq!(render(&permutation), reference);
        }
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn markup_characters_in_fields_are_escaped() {
        let output = render(&[event(
            "Shakespeare <in> the Park & Friends",
            "2025-05-15T19:00:00-04:00",
            "Quad \"North\"",
            "",
        )]);
        assert!(output.contains("Shakespeare &lt;in&gt; the Park &amp; Friends"));
        assert!(output.contains("Quad &quot;North&quot;"));
    }

    #[test]
    fn blank_titles_are_skipped_without_aborting() {
        let output = render(&[
            event("", "2025-05-15T09:00:00-04:00", "Indianapolis", ""),
            event("Gala", "2025-05-15T19:00:00-04:00", "Indianapolis", ""),
        ]);
        assert_eq!(output.matches("<li>").count(), 1);
        assert!(output.contains("Gala"));
    }

    #[test]
    fn midday_times_keep_no_leading_zero() {
        let output = render(&[event(
            "Noon Concert",
            "2025-05-15T12:00:00-04:00",
            "Indianapolis",
            "",
        )]);
        assert!(output.contains("12:00 PM"));
    }
}
