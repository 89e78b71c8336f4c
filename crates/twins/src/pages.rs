//! HTML the twin serves, shaped after a default WordPress theme.

use std::fmt::Write as _;

use crate::state::{Comment, TwinConfig};

/// Field limits WordPress enforces on comment columns, in bytes.
pub const MAX_AUTHOR: usize = 245;
pub const MAX_EMAIL: usize = 100;
pub const MAX_URL: usize = 200;
pub const MAX_COMMENT: usize = 65_525;

pub const AUTH_COOKIE: &str = "wordpress_logged_in_twin";

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body_attrs: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en-US\">\n<head><meta charset=\"UTF-8\"><title>{}</title></head>\n<body {body_attrs}>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// The `wp_die` screen: error banner plus a back link.
#[must_use]
pub fn die_page(title: &str, message: &str) -> String {
    let body = format!(
        "<div class=\"wp-die-message\"><p><strong>Error:</strong> {}</p></div>\n<p><a href='javascript:history.back()'>&laquo; Back</a></p>",
        escape_html(message)
    );
    layout(title, "id=\"error-page\"", &body)
}

/// The single post, its comment form, and the pending comment named by
/// `?unapproved=` if there is one.
#[must_use]
pub fn post_page(config: &TwinConfig, pending: Option<&Comment>) -> String {
    let mut body = format!(
        "<article id=\"post-{id}\" class=\"post\"><h1 class=\"entry-title\">{title}</h1>\n<div class=\"entry-content\"><p>Welcome to WordPress.</p></div></article>\n",
        id = config.post_id,
        title = escape_html(&config.post_title)
    );

    if let Some(comment) = pending {
        let _ = write!(
            body,
            "<ol class=\"comment-list\"><li id=\"comment-{id}\" class=\"comment\">\n<div class=\"comment-author\"><b class=\"fn\">{author}</b></div>\n<em class=\"comment-awaiting-moderation\">Your comment is awaiting moderation.</em>\n<div class=\"comment-content\"><p>{content}</p></div>\n</li></ol>\n",
            id = comment.id,
            author = escape_html(&comment.author),
            content = escape_html(&comment.content)
        );
    }

    let _ = write!(
        body,
        r#"<div id="respond" class="comment-respond">
<h3 id="reply-title" class="comment-reply-title">Leave a Reply</h3>
<form action="/wp-comments-post.php" method="post" id="commentform" class="comment-form">
<p class="comment-form-comment"><label for="comment">Comment *</label>
<textarea id="comment" name="comment" cols="45" rows="8" maxlength="{MAX_COMMENT}" required></textarea></p>
<p class="comment-form-author"><label for="author">Name *</label>
<input id="author" name="author" type="text" value="" size="30" maxlength="{MAX_AUTHOR}" autocomplete="name" required></p>
<p class="comment-form-email"><label for="email">Email *</label>
<input id="email" name="email" type="email" value="" size="30" maxlength="{MAX_EMAIL}" autocomplete="email" required></p>
<p class="comment-form-url"><label for="url">Website</label>
<input id="url" name="url" type="url" value="" size="30" maxlength="{MAX_URL}" autocomplete="url"></p>
<p class="form-submit"><input name="submit" type="submit" id="submit" class="submit" value="Post Comment">
<input type="hidden" name="comment_post_ID" value="{post_id}" id="comment_post_ID">
<input type="hidden" name="comment_parent" id="comment_parent" value="0"></p>
</form>
</div>"#,
        post_id = config.post_id
    );

    layout(&config.post_title, "class=\"post-template-default single\"", &body)
}

#[must_use]
pub fn not_found_page() -> String {
    layout(
        "Page not found",
        "class=\"error404\"",
        "<h1 class=\"page-title\">Oops! That page can&rsquo;t be found.</h1>",
    )
}

/// `wp-login.php`, optionally with an error notice.
#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    let notice = error.map_or_else(String::new, |message| {
        format!(
            "<div id=\"login_error\"><strong>Error:</strong> {}</div>\n",
            escape_html(message)
        )
    });
    let body = format!(
        r#"<div id="login"><h1><a href="/">Powered by WordPress</a></h1>
{notice}<form name="loginform" id="loginform" action="/wp-login.php" method="post">
<p><label for="user_login">Username or Email Address</label>
<input type="text" name="log" id="user_login" class="input" value="" size="20" autocapitalize="off" autocomplete="username" required></p>
<p><label for="user_pass">Password</label>
<input type="password" name="pwd" id="user_pass" class="input password-input" value="" size="20" autocomplete="current-password" required></p>
<p class="submit"><input type="submit" name="wp-submit" id="wp-submit" class="button button-primary button-large" value="Log In"></p>
</form></div>"#
    );
    layout("Log In", "class=\"login wp-core-ui\"", &body)
}

#[must_use]
pub fn dashboard_page(username: &str) -> String {
    let body = format!(
        "<div id=\"wpadminbar\" class=\"nojq\"><ul id=\"wp-admin-bar-top-secondary\"><li id=\"wp-admin-bar-my-account\">Howdy, <span class=\"display-name\">{}</span></li></ul></div>\n<div id=\"wpwrap\"><div id=\"wpbody-content\"><h1>Dashboard</h1></div></div>",
        escape_html(username)
    );
    layout("Dashboard", "class=\"wp-admin index-php\"", &body)
}
