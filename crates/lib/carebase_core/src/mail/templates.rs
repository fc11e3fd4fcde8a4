//! HTML email bodies.

/// Subject line of the password reset email.
pub const RESET_SUBJECT: &str = "Password Reset Request";

/// Build the link embedded in a reset email: `{base}/{code}`.
pub fn reset_link(base: &str, code: &str) -> String {
    format!("{}/{code}", base.trim_end_matches('/'))
}

/// Password reset email with a single call-to-action link.
pub fn reset_password_email(link: &str, hospital_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f4f4f4; }}
        .email-container {{ max-width: 600px; margin: 20px auto; background: #ffffff; border-radius: 8px; overflow: hidden; }}
        .header {{ background-color: #007BFF; color: #ffffff; text-align: center; padding: 20px; font-size: 24px; }}
        .body {{ padding: 20px; color: #333333; line-height: 1.6; }}
        .button {{ display: inline-block; background-color: #007BFF; color: white !important; text-decoration: none; padding: 10px 20px; border-radius: 5px; }}
    </style>
</head>
<body>
    <div class="email-container">
        <div class="header">{RESET_SUBJECT}</div>
        <div class="body">
            <p>We received a request to reset your password. This link will expire in 10 minutes.</p>
            <p style="text-align: center;"><a href="{link}" class="button">Reset Password</a></p>
            <p>If you didn't request this, you can safely ignore this email. Your password will not change until you open the link above and choose a new one.</p>
            <p><strong>{hospital_name}</strong></p>
        </div>
    </div>
</body>
</html>
"#
    )
}
