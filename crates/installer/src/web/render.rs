//! HTML rendering of installer pages

use std::fmt::Write;

use crate::error::InstallError;
use crate::i18n::{Locale, MessageKey};
use crate::workflow::InstallOutcome;

/// Directory suggested in the form
pub const DEFAULT_DIRECTORY: &str = "./openlimbas";

const STYLE: &str = "\
body{background:#84827c;font-family:system-ui,\"Segoe UI\",Roboto,Helvetica,Arial,sans-serif}\
#content{max-width:48rem;margin:3rem auto;background:#fff;padding:1.5rem;border-radius:.3rem;position:relative}\
#lang-select{position:absolute;top:.5rem;right:.5rem}\
.btn{display:inline-block;padding:.375rem .75rem;color:#fff;background:#588100;border:1px solid #588100;text-decoration:none}\
.text-center{text-align:center}.mb-3{margin-bottom:1rem}\
.alert{padding:1rem;border:1px solid transparent;border-radius:.3rem}\
.alert-success{color:#146c43;background:#d1e7dd;border-color:#a3cfbb}\
.alert-warning{color:#997404;background:#ffe69c;border-color:#ffe69c}\
.alert-danger{color:#b02a37;background:#f8d7da;border-color:#f1aeb5}\
input[type=text]{display:block;width:100%;padding:.375rem .75rem;font-size:1rem;border:1px solid #dee2e6;border-radius:.375rem;box-sizing:border-box}\
footer{padding-top:4rem;color:#757575;font-size:.8rem;text-align:center}footer a{color:#757575}";

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the full page for an outcome
pub fn render_page(locale: Locale, outcome: &InstallOutcome) -> String {
    let t = |key| locale.text(key);
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n<main id=\"content\">\n",
        lang = locale.code(),
        style = STYLE,
        title = escape_html(t(MessageKey::Title)),
    );

    html.push_str("<nav id=\"lang-select\">");
    for other in Locale::all() {
        let code = other.code();
        if *other == locale {
            let _ = write!(html, " <strong>{}</strong>", code.to_uppercase());
        } else {
            let _ = write!(html, " <a href=\"?lang={}\">{}</a>", code, code.to_uppercase());
        }
    }
    html.push_str("</nav>\n");

    let _ = writeln!(html, "<h1 class=\"text-center\">{}</h1>", escape_html(t(MessageKey::Title)));

    match outcome {
        InstallOutcome::AwaitingInput {
            preflight_error,
            windows_warning,
        } => render_form(&mut html, locale, preflight_error.as_ref(), *windows_warning),
        InstallOutcome::Succeeded {
            continuation_link,
            document_root,
            self_delete_warning,
            ..
        } => {
            alert(&mut html, "alert-success text-center", t(MessageKey::Succeeded));
            if let Some(warning) = self_delete_warning {
                alert(&mut html, "alert-warning", t(warning.message_key()));
            }
            let _ = writeln!(
                html,
                "<div class=\"alert alert-warning mb-3\">{}<br>{}</div>",
                escape_html(t(MessageKey::DocumentRootHint)),
                escape_html(&document_root.display().to_string()),
            );
            let _ = writeln!(html, "<p>{}</p>", escape_html(t(MessageKey::ContinuationHint)));
            link_button(&mut html, continuation_link, t(MessageKey::ContinueToInstallation));
        }
        InstallOutcome::Failed(error) => {
            alert(&mut html, "alert-danger text-center", t(error.message_key()));
            back_button(&mut html, locale);
        }
        InstallOutcome::Invalid => {
            alert(&mut html, "alert-danger", t(MessageKey::InvalidStep));
            back_button(&mut html, locale);
        }
    }

    html.push_str(
        "<footer>Copyright &copy; <a href=\"https://limbas.com\" target=\"_blank\">Limbas GmbH</a></footer>\n\
         </main>\n</body>\n</html>\n",
    );
    html
}

fn render_form(html: &mut String, locale: Locale, preflight_error: Option<&InstallError>, windows_warning: bool) {
    let t = |key| locale.text(key);
    let _ = writeln!(html, "<p>{}</p>", escape_html(t(MessageKey::Introduction)));

    if let Some(error) = preflight_error {
        html.push_str("<div class=\"alert alert-danger\">");
        let _ = write!(html, "<p>{}</p>", escape_html(t(error.message_key())));
        if let InstallError::MissingCapability(missing) = error {
            html.push_str("<ul>");
            for capability in missing {
                let _ = write!(html, "<li>{}</li>", escape_html(capability.name()));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>\n");
        return;
    }

    let _ = writeln!(
        html,
        "<form action=\"?lang={}\" method=\"post\" id=\"install-form\">",
        locale.code()
    );
    if windows_warning {
        alert(html, "alert-warning", t(MessageKey::WindowsUnsupported));
    }
    let _ = writeln!(
        html,
        "<div class=\"mb-3\"><p><label for=\"directory\">{label}</label></p>\
         <input type=\"text\" name=\"directory\" id=\"directory\" value=\"{value}\" required>\
         <input type=\"hidden\" name=\"step\" value=\"1\"></div>\n\
         <div class=\"text-center\"><button class=\"btn\" type=\"submit\" title=\"{hint}\">{submit}</button></div>\n</form>",
        label = escape_html(t(MessageKey::DirectoryPrompt)),
        value = DEFAULT_DIRECTORY,
        hint = escape_html(t(MessageKey::Downloading)),
        submit = escape_html(t(MessageKey::InstallNow)),
    );
}

fn alert(html: &mut String, class: &str, text: &str) {
    let _ = writeln!(html, "<div class=\"alert {} mb-3\">{}</div>", class, escape_html(text));
}

fn link_button(html: &mut String, href: &str, label: &str) {
    let _ = writeln!(
        html,
        "<div class=\"text-center\"><a class=\"btn\" href=\"{}\">{}</a></div>",
        escape_html(href),
        escape_html(label)
    );
}

fn back_button(html: &mut String, locale: Locale) {
    link_button(html, &format!("?lang={}", locale.code()), locale.text(MessageKey::Back));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::Capability;
    use crate::target_dir::TargetDirectory;
    use std::path::PathBuf;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_missing_capabilities_replace_form() {
        let outcome = InstallOutcome::AwaitingInput {
            preflight_error: Some(InstallError::MissingCapability(vec![Capability::HttpClient])),
            windows_warning: false,
        };
        let page = render_page(Locale::En, &outcome);

        assert!(page.contains("<li>https client</li>"));
        assert!(!page.contains("<form"));
    }

    #[test]
    fn test_form_posts_with_locale() {
        let outcome = InstallOutcome::AwaitingInput {
            preflight_error: None,
            windows_warning: true,
        };
        let page = render_page(Locale::De, &outcome);

        assert!(page.contains("action=\"?lang=de\""));
        assert!(page.contains("value=\"./openlimbas\""));
        assert!(page.contains("nicht offiziell unterstützt"));
    }

    #[test]
    fn test_success_page_with_self_delete_warning() {
        let target = TargetDirectory::parse("./out").unwrap();
        let outcome = InstallOutcome::Succeeded {
            continuation_link: target.continuation_link(),
            document_root: PathBuf::from("/srv/www/out/public"),
            target,
            self_delete_warning: Some(InstallError::SelfDeleteFailed {
                path: PathBuf::from("installer"),
                source: None,
            }),
        };
        let page = render_page(Locale::En, &outcome);

        assert!(page.contains("href=\"./out/public/install\""));
        assert!(page.contains("/srv/www/out/public"));
        assert!(page.contains("Failed to remove installer script."));
        assert!(page.contains("The installer has stopped."));
        let hint = page.find("The installer has stopped.").unwrap();
        let link = page.find("href=\"./out/public/install\"").unwrap();
        assert!(hint < link);
    }

    #[test]
    fn test_failure_page_has_back_link() {
        let page = render_page(Locale::De, &InstallOutcome::Failed(InstallError::EmptyDirectoryInput));

        assert!(page.contains("Bitte Verzeichnis eintragen."));
        assert!(page.contains("href=\"?lang=de\""));
        assert!(page.contains("Zurück"));
    }
}
