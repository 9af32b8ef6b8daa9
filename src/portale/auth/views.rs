//! Minimal HTML rendering for the login and registration forms.
//!
//! The view contract is small: a form carries the challenge (hidden field)
//! and an optional inline error message. Styling is left to whoever fronts
//! this service.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Login,
    Register,
}

impl AuthView {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
        }
    }

    #[must_use]
    pub fn action(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
        }
    }

    fn alternate(self) -> (&'static str, &'static str) {
        match self {
            Self::Login => ("/auth/register", "Create an account"),
            Self::Register => ("/auth/login", "Sign in instead"),
        }
    }
}

/// Render a full HTML document for the given view.
#[must_use]
pub fn render(view: AuthView, challenge: &str, error_message: &str) -> String {
    let title = view.title();
    let action = view.action();
    let challenge = escape(challenge);
    let (alternate_href, alternate_label) = view.alternate();

    let error = if error_message.is_empty() {
        String::new()
    } else {
        format!("\n      <p class=\"error\">{}</p>", escape(error_message))
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
  </head>
  <body>
    <main>
      <h1>{title}</h1>{error}
      <form method="post" action="{action}">
        <input type="hidden" name="challenge" value="{challenge}">
        <label>Email <input type="email" name="email" required></label>
        <label>Password <input type="password" name="password" required></label>
        <button type="submit">{title}</button>
      </form>
      <a href="{alternate_href}?login_challenge={challenge}">{alternate_label}</a>
    </main>
  </body>
</html>
"#
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
