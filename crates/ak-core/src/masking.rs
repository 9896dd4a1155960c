//! Email masking for account-recovery display.

/// Mask the local part of an email for display after a lookup.
///
/// The first and last character of the local part are preserved and the
/// interior replaced with `*`. Two-character locals keep only the first
/// character; single-character locals are fully masked. The domain is left
/// untouched. Input without an `@` is returned unchanged (callers validate
/// before lookup).
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let chars: Vec<char> = local.chars().collect();
    let masked = match chars.len() {
        0 => String::new(),
        1 => String::from("*"),
        2 => format!("{}*", chars[0]),
        n => {
            let mut s = String::with_capacity(n);
            s.push(chars[0]);
            s.extend(std::iter::repeat_n('*', n - 2));
            s.push(chars[n - 1]);
            s
        }
    };

    format!("{masked}@{domain}")
}
