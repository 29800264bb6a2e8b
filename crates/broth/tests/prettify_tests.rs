//! Тесты форматирования с отступами

use broth::{Html, PrettifyError, PrettifyOptions};

const HTML_DOC: &str = r#"<html>
  <head>
    <title>The Dormouse's story</title>
  </head>
  <body>
    <h1>The Dormouse's story</h1>
    <ul>
      <li><a href="https://dormouse.com/elsie" class="sister" id="elsie">Elsie</a></li>
      <li><a href="https://dormouse.com/lacie" class="sister" id="lacie">Lacie</a></li>
      <li><a href="https://dormouse.com/tillie" class="sister" id="tillie">Tillie</a></li>
    </ul>
  </body>
</html>
"#;

const LIST_ITEMS: &str = r#"
<li>
<a class="sister" href="https://dormouse.com/elsie" id="elsie">Elsie</a>
</li>
<li>
<a class="sister" href="https://dormouse.com/lacie" id="lacie">Lacie</a>
</li>
<li>
<a class="sister" href="https://dormouse.com/tillie" id="tillie">Tillie</a>
</li>
"#;

const LONG_TEXT: &str = "Voluptatum qui magni omnis molestias beatae sint dolor eius aliquid aut consequatur. Possimus optio dolores veniam voluptatibus autem iste ut et ut nostrum tempora quia facere. Reprehenderit at aut laboriosam consequatur id nulla.";

fn prettify(markup: &str) -> String {
    Html::parse(markup)
        .prettify(&PrettifyOptions::default())
        .unwrap()
}

fn unordered_list() -> String {
    format!("\n<ul>{LIST_ITEMS}</ul>\n")
}

#[test]
fn test_prettify_no_root() {
    let expected = r#"<li>
  <a class="sister" href="https://dormouse.com/elsie" id="elsie">Elsie</a>
</li>
<li>
  <a class="sister" href="https://dormouse.com/lacie" id="lacie">Lacie</a>
</li>
<li>
  <a class="sister" href="https://dormouse.com/tillie" id="tillie">Tillie</a>
</li>
"#;

    assert_eq!(prettify(LIST_ITEMS), expected);
}

#[test]
fn test_prettify_minimal() {
    let expected = r#"<ul>
  <li>
    <a class="sister" href="https://dormouse.com/elsie" id="elsie">Elsie</a>
  </li>
  <li>
    <a class="sister" href="https://dormouse.com/lacie" id="lacie">Lacie</a>
  </li>
  <li>
    <a class="sister" href="https://dormouse.com/tillie" id="tillie">Tillie</a>
  </li>
</ul>
"#;

    assert_eq!(prettify(&unordered_list()), expected);
}

#[test]
fn test_prettify_4_space_indent() {
    let expected = r#"<ul>
    <li>
        <a class="sister" href="https://dormouse.com/elsie" id="elsie">Elsie</a>
    </li>
    <li>
        <a class="sister" href="https://dormouse.com/lacie" id="lacie">Lacie</a>
    </li>
    <li>
        <a class="sister" href="https://dormouse.com/tillie" id="tillie">Tillie</a>
    </li>
</ul>
"#;

    let options = PrettifyOptions::default().with_indent(4);
    let actual = Html::parse(&unordered_list()).prettify(&options).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_prettify_zero_indent_keeps_line_breaks() {
    let expected = "<ul>\n<li>1</li>\n<li>2</li>\n</ul>\n";

    let options = PrettifyOptions::default().with_indent(0);
    let actual = Html::parse("<ul><li>1</li><li>2</li></ul>")
        .prettify(&options)
        .unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_prettify_long_lines() {
    let expected = format!(
        "<ul>\n  <li>\n    <a class=\"sister\" href=\"#\" id=\"long-tweet\">\n      {LONG_TEXT}\n    </a>\n  </li>\n</ul>\n"
    );

    let markup = format!(
        r##"<ul><li><a class="sister" href="#" id="long-tweet">{LONG_TEXT}</a></li></ul>"##
    );
    assert_eq!(prettify(&markup), expected);
}

#[test]
fn test_prettify_long_lines_without_max_line_length() {
    let expected = format!(
        "<ul>\n  <li>\n    <a class=\"sister\" href=\"#\" id=\"long-tweet\">{LONG_TEXT}</a>\n  </li>\n</ul>\n"
    );

    let markup = format!(
        r##"<ul><li><a class="sister" href="#" id="long-tweet">{LONG_TEXT}</a></li></ul>"##
    );
    let options = PrettifyOptions::default().without_line_wrapping();
    let actual = Html::parse(&markup).prettify(&options).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_prettify_wrap_threshold() {
    let text = "a".repeat(250);
    let markup = format!(r#"<a id="x">{text}</a>"#);

    assert_eq!(
        prettify(&markup),
        format!("<a id=\"x\">\n  {text}\n</a>\n")
    );

    let options = PrettifyOptions::default().without_line_wrapping();
    assert_eq!(
        Html::parse(&markup).prettify(&options).unwrap(),
        format!("<a id=\"x\">{text}</a>\n")
    );

    // Ровно на пороге текст остаётся в строке с тегами.
    let at_limit = "b".repeat(88);
    assert_eq!(
        prettify(&format!("<p>{at_limit}</p>")),
        format!("<p>{at_limit}</p>\n")
    );
}

#[test]
fn test_prettify_with_text_children() {
    let expected = r##"<ul>
  <li>
    extra text
    <a class="sister" href="#" id="long-tweet">Voluptatum qui</a>
    even more text
  </li>
</ul>
"##;

    let markup = r##"<ul><li>extra text<a class="sister" href="#" id="long-tweet">Voluptatum qui</a>even more text</li></ul>"##;
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_with_text_children_2() {
    let expected = r##"<ul>
  <li>
    extra text1
    <a class="sister" href="#" id="long-tweet1">Voluptatum qui1</a>
    even more text1
  </li>
  <li>
    extra text2
    <a class="sister" href="#" id="long-tweet2">Voluptatum qui2</a>
    even more text2
  </li>
</ul>
"##;

    let markup = r##"
<ul>
<li>extra text1<a class="sister" href="#" id="long-tweet1">Voluptatum qui1</a>even more text1</li>
<li>extra text2<a class="sister" href="#" id="long-tweet2">Voluptatum qui2</a>even more text2</li>
</ul>"##;
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_with_text_children_3() {
    let expected = "<a>Voluptatum qui1</a>\n1\n<a>Voluptatum qui2</a>\n";

    let markup = "\n<a>Voluptatum qui1</a>1\n<a>Voluptatum qui2</a>\n";
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_with_text_children_4() {
    let expected = r#"9
<ul>
  <li>
    0
    1
    <a>Voluptatum qui1</a>
    2
    3
    <a>Voluptatum qui2</a>
    4
    <a>Voluptatum qui3</a>
    5
    6
    <a>Voluptatum qui4</a>
    7
  </li>
</ul>
8
"#;

    let markup = r#"
9<ul>
<li>0
1<a>Voluptatum qui1</a>2
3<a>Voluptatum qui2</a>4
<a>Voluptatum qui3</a>5
6<a>Voluptatum qui4</a>
7</li>
</ul>8
"#;
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_structural_whitespace() {
    let expected = "<div>\n  <span>a</span>\n  hello\n  <span>b</span>\n</div>\n";

    let markup = "<div><span>a</span>\n  hello  \n<span>b</span></div>";
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_html_doc() {
    let expected = r#"<html>
  <head>
    <title>The Dormouse's story</title>
  </head>
  <body>
    <h1>The Dormouse's story</h1>
    <ul>
      <li>
        <a href="https://dormouse.com/elsie" class="sister" id="elsie">Elsie</a>
      </li>
      <li>
        <a href="https://dormouse.com/lacie" class="sister" id="lacie">Lacie</a>
      </li>
      <li>
        <a href="https://dormouse.com/tillie" class="sister" id="tillie">Tillie</a>
      </li>
    </ul>
  </body>
</html>
"#;

    assert_eq!(prettify(HTML_DOC), expected);
}

#[test]
fn test_prettify_doc_example() {
    let expected = r#"<html>
  <head>
    <title>The Dormouse's Story</title>
  </head>
  <body>
    <h1>The Dormouse's Story</h1>
    <ul>
      <li>
        <a href="http://example.com/elsie" class="sister" id="elsie">Elsie</a>
      </li>
      <li>
        <a href="http://example.com/lacie" class="sister" id="lacie">Lacie</a>
      </li>
    </ul>
  </body>
</html>
"#;

    let markup = r#"
<html>
<head>
<title>The Dormouse's Story</title>
</head>
<body>
<h1>The Dormouse's Story</h1>

<ul>
<li><a href="http://example.com/elsie" class="sister" id="elsie">Elsie</a></li>
<li><a href="http://example.com/lacie" class="sister" id="lacie">Lacie</a></li>
</ul>
</body>
</html>
"#;
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_element() {
    let html = Html::parse("\n<ul>\n<li id=\"li-1\">1</li>\n</ul>");
    let ul = html.query("ul").unwrap().next().unwrap();

    let actual = ul.prettify(&PrettifyOptions::default()).unwrap();
    assert_eq!(actual, "<ul>\n  <li id=\"li-1\">1</li>\n</ul>\n");
}

#[test]
fn test_prettify_doctype_and_comments() {
    let expected = r#"<!DOCTYPE html>
<!-- top -->
<html>
  <head>
    <title>T</title>
  </head>
  <body>
    <!-- inside -->
    <p>Hi</p>
  </body>
</html>
"#;

    let markup = "<!DOCTYPE html>\n<!-- top -->\n<html><head><title>T</title></head><body><!--inside--><p>Hi</p></body></html>";
    assert_eq!(prettify(markup), expected);
}

#[test]
fn test_prettify_legacy_doctype_is_normalized() {
    let markup = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"><html><body></body></html>"#;
    assert!(prettify(markup).starts_with("<!DOCTYPE html>\n<html>\n"));
}

#[test]
fn test_prettify_fragment_elides_wrappers() {
    let actual = prettify("<div>Simple fragment</div>");
    assert_eq!(actual, "<div>Simple fragment</div>\n");

    let actual = prettify("<html><body>Full</body></html>");
    assert_eq!(
        actual,
        "<html>\n  <head></head>\n  <body>Full</body>\n</html>\n"
    );
}

#[test]
fn test_prettify_fragment_keeps_leading_comment() {
    assert_eq!(
        prettify("<!-- note --><div>x</div>"),
        "<!-- note -->\n<div>x</div>\n"
    );
}

#[test]
fn test_prettify_void_elements() {
    let actual = prettify(r#"<p>a<br>b<img src="x.png" alt="x"></p>"#);
    assert_eq!(
        actual,
        "<p>\n  a\n  <br>\n  b\n  <img src=\"x.png\" alt=\"x\">\n</p>\n"
    );
    assert!(!actual.contains("</br>"));
    assert!(!actual.contains("</img>"));
}

#[test]
fn test_prettify_escapes_text() {
    assert_eq!(prettify("<p>a &lt; b &amp; c</p>"), "<p>a &lt; b &amp; c</p>\n");
    assert_eq!(
        prettify("<script>if (a < b) {}</script>"),
        "<script>if (a < b) {}</script>\n"
    );
}

#[test]
fn test_prettify_reindents_multiline_text() {
    let markup = "<div><b>x</b>first\n        second\n  third</div>";
    assert_eq!(
        prettify(markup),
        "<div>\n  <b>x</b>\n  first\n  second\n  third\n</div>\n"
    );
}

#[test]
fn test_prettify_trims_text_only_body() {
    let expected = "<html>\n  <head></head>\n  <body>Content</body>\n</html>\n";

    assert_eq!(prettify("<BODY>Content</BODY>"), expected);
    assert_eq!(prettify("<html><body>\n  Content \n</body></html>"), expected);
    assert_eq!(prettify(expected), expected);
}

#[test]
fn test_prettify_leaf_with_comment_at_threshold() {
    let text = "x".repeat(78);
    let inline = format!("<p>{text}<!-- c --></p>\n");
    assert_eq!(prettify(&format!("<p>{text}<!--c--></p>")), inline);
    assert_eq!(prettify(&inline), inline);

    let text = "x".repeat(79);
    let wrapped = format!("<p>\n  {text}<!-- c -->\n</p>\n");
    assert_eq!(prettify(&format!("<p>{text}<!--c--></p>")), wrapped);
    assert_eq!(prettify(&wrapped), wrapped);
}

#[test]
fn test_prettify_keeps_preformatted_leading_newline() {
    let expected = "<div>\n  <pre>\n\nx</pre>\n  <b>y</b>\n</div>\n";
    assert_eq!(prettify("<div><pre>\n\nx</pre><b>y</b></div>"), expected);
    assert_eq!(prettify(expected), expected);

    let expected = "<div>\n  <textarea>\n\nhello</textarea>\n</div>\n";
    assert_eq!(prettify("<div><textarea>\n\nhello</textarea></div>"), expected);
    assert_eq!(prettify(expected), expected);
}

#[test]
fn test_prettify_empty_input() {
    assert_eq!(prettify(""), "");
}

#[test]
fn test_prettify_is_idempotent() {
    let long_list = format!(
        r##"<ul><li><a class="sister" href="#" id="long-tweet">{LONG_TEXT}</a></li></ul>"##
    );
    let inputs = [
        HTML_DOC.to_string(),
        unordered_list(),
        long_list,
        "\n9<ul>\n<li>0\n1<a>q1</a>2\n3<a>q2</a>\n7</li>\n</ul>8\n".to_string(),
        "<!DOCTYPE html><!-- c --><html><body><p>a<br>b</p></body></html>".to_string(),
        "<html><body>Full</body></html>".to_string(),
        "<BODY>Content</BODY>".to_string(),
        format!("<p>{}<!--c--></p>", "x".repeat(79)),
        format!("<p>{}<!--c--></p>", "x".repeat(78)),
        "<div><pre>\n\nx</pre><b>y</b></div>".to_string(),
        "<div><textarea>\n\nhello</textarea></div>".to_string(),
    ];

    for options in [
        PrettifyOptions::default(),
        PrettifyOptions::default().with_indent(4),
        PrettifyOptions::default().without_line_wrapping(),
    ] {
        for input in &inputs {
            let once = Html::parse(input).prettify(&options).unwrap();
            let twice = Html::parse(&once).prettify(&options).unwrap();
            assert_eq!(once, twice, "input: {input}");
        }
    }
}

#[test]
fn test_prettify_rejects_negative_options() {
    assert_eq!(
        PrettifyOptions::try_new(-2, None),
        Err(PrettifyError::NegativeIndent(-2))
    );
    assert_eq!(
        PrettifyOptions::try_new(2, Some(-1)),
        Err(PrettifyError::NegativeLineLength(-1))
    );
}

#[test]
fn test_prettify_deep_nesting_is_an_error() {
    let markup = "<div>".repeat(600);
    let result = Html::parse(&markup).prettify(&PrettifyOptions::default());
    assert!(matches!(result, Err(PrettifyError::TooDeep { .. })));
}
