//! String-level edits of an HTML template.

/// Set the document title: replace an existing `<title>` element, or add
/// one before `</head>`, or at the very start when there is no head.
pub fn inject_title(html: &str, title: &str) -> String {
    let element = format!("<title>{}</title>", escape(title));

    if let Some(start) = html.find("<title>") {
        if let Some(len) = html[start..].find("</title>") {
            let end = start + len + "</title>".len();
            return format!("{}{}{}", &html[..start], element, &html[end..]);
        }
    }

    if let Some(pos) = html.find("</head>") {
        return format!("{}  {}\n{}", &html[..pos], element, &html[pos..]);
    }

    format!("{element}\n{html}")
}

/// Add `tags` before the closing `</body>`, or at the end when the template
/// has none.
pub fn inject_before_body_end(html: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return html.to_string();
    }

    if let Some(pos) = html.rfind("</body>") {
        let extra: usize = tags.iter().map(|tag| tag.len() + 3).sum();
        let mut result = String::with_capacity(html.len() + extra);
        result.push_str(&html[..pos]);
        for tag in tags {
            result.push_str("  ");
            result.push_str(tag);
            result.push('\n');
        }
        result.push_str(&html[pos..]);
        return result;
    }

    let mut result = html.to_string();
    for tag in tags {
        if !result.is_empty() && !result.ends_with('\n') {
            result.push('\n');
        }
        result.push_str(tag);
    }
    result.push('\n');
    result
}

pub fn script_tag(src: &str) -> String {
    format!(r#"<script defer src="{}"></script>"#, escape(src))
}

/// `public_path` and `file` joined by exactly one `/`; an empty public path
/// yields `file` unchanged.
pub fn public_url(public_path: &str, file: &str) -> String {
    if public_path.is_empty() || public_path.ends_with('/') {
        format!("{public_path}{file}")
    } else {
        format!("{public_path}/{file}")
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
