//! Form encoding and result page parsing

// crate modules
use crate::config::Prediction;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till1, take_until};
use nom::character::complete::{char, multispace0};
use nom::sequence::{delimited, preceded, tuple};
use nom::IResult;

/// Extensions of result files worth downloading
pub const RESULT_EXTENSIONS: [&str; 3] = [".dat", ".txt", ".out"];

/// Name and value pairs submitted for a prediction
///
/// Unticked checkboxes are left out. An email address also ticks the
/// `email` box and fills `emailaddress`.
pub fn form_pairs(prediction: &Prediction, email: Option<&str>) -> Vec<(String, String)> {
    let mut pairs = prediction
        .fields
        .iter()
        .filter_map(|f| f.form_value().map(|v| (f.selector.clone(), v)))
        .collect::<Vec<(String, String)>>();

    if let Some(address) = email {
        pairs.push(("email".to_string(), "1".to_string()));
        pairs.push(("emailaddress".to_string(), address.to_string()));
    }
    pairs
}

/// `application/x-www-form-urlencoded` body
///
/// ```rust
/// # use hfxs_fonll::url_encode;
/// let pairs = vec![
///     ("scheme".to_string(), "FONLL-C".to_string()),
///     ("note".to_string(), "a b&c".to_string()),
/// ];
/// assert_eq!(url_encode(&pairs), "scheme=FONLL-C&note=a+b%26c");
/// ```
pub fn url_encode(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<String>>()
        .join("&")
}

fn encode_component(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Value of an `href` attribute, quoted or bare
fn href(i: &str) -> IResult<&str, &str> {
    preceded(
        tuple((tag_no_case("href"), multispace0, char('='), multispace0)),
        alt((
            delimited(char('"'), take_until("\""), char('"')),
            delimited(char('\''), take_until("'"), char('\'')),
            take_till1(|c: char| c.is_whitespace() || c == '>'),
        )),
    )(i)
}

/// Every `href` target on a page, in order, whatever the case of `href`
pub fn links(html: &str) -> Vec<&str> {
    let lower = html.to_ascii_lowercase();
    let mut found = Vec::new();
    let mut start = 0;
    while let Some(offset) = lower[start..].find("href") {
        let at = start + offset;
        match href(&html[at..]) {
            Ok((rest, link)) => {
                found.push(link);
                start = html.len() - rest.len();
            }
            Err(_) => start = at + 4,
        }
    }
    found
}

/// Links to result files, by extension
///
/// ```rust
/// # use hfxs_fonll::result_links;
/// let page = r#"<a href="tmp/1234.dat">data</a> <a href='help.html'>?</a> <A HREF=out/1234.out>"#;
/// assert_eq!(result_links(page), vec!["tmp/1234.dat", "out/1234.out"]);
/// ```
pub fn result_links(html: &str) -> Vec<&str> {
    let mut found: Vec<&str> = Vec::new();
    for link in links(html) {
        let lower = link.to_ascii_lowercase();
        let is_result = RESULT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext));
        if is_result && !found.contains(&link) {
            found.push(link);
        }
    }
    found
}

/// Content of the first `<pre>` block
///
/// ```rust
/// # use hfxs_fonll::pre_block;
/// assert_eq!(pre_block("<p>x</p><pre class=\"out\">1 2\n3 4\n</pre>"), Some("1 2\n3 4\n"));
/// assert_eq!(pre_block("<p>nothing</p>"), None);
/// ```
pub fn pre_block(html: &str) -> Option<&str> {
    let mut open = tuple((
        take_until::<_, _, nom::error::Error<&str>>("<pre"),
        tag("<pre"),
        take_until(">"),
        char('>'),
    ));
    let (body, _) = open(html).ok()?;
    let (_, content) = take_until::<_, _, nom::error::Error<&str>>("</pre>")(body).ok()?;
    Some(content)
}

/// Absolute address of a link found on the page at `base`
///
/// ```rust
/// # use hfxs_fonll::resolve_link;
/// let base = "http://www.example.org/fonll/fonllform.html";
/// assert_eq!(resolve_link(base, "tmp/1.dat"), "http://www.example.org/fonll/tmp/1.dat");
/// assert_eq!(resolve_link(base, "/tmp/1.dat"), "http://www.example.org/tmp/1.dat");
/// assert_eq!(resolve_link(base, "https://cdn.org/1.dat"), "https://cdn.org/1.dat");
/// ```
pub fn resolve_link(base: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }

    let (scheme, rest) = base.split_once("://").unwrap_or(("http", base));
    let host = rest.split('/').next().unwrap_or(rest);
    if let Some(path) = link.strip_prefix('/') {
        return format!("{scheme}://{host}/{path}");
    }

    let directory = match base.rfind('/') {
        Some(i) if i > scheme.len() + 2 => &base[..i],
        _ => base,
    };
    format!("{directory}/{link}")
}

/// Last path component of a link
pub fn file_name(link: &str) -> &str {
    let link = link.split(['?', '#']).next().unwrap_or(link);
    link.rsplit('/').next().unwrap_or(link)
}
