use crate::error::Error;
use bech32::{ToBase32, Variant};
use nostr_types::PublicKeyHex;

/// The bech32 `npub1...` rendering of a hex public key
pub fn npub(pubkey: &PublicKeyHex) -> Result<String, Error> {
    let bytes = hex::decode(pubkey.as_str())?;
    Ok(bech32::encode("npub", bytes.to_base32(), Variant::Bech32)?)
}

/// A short rendering of a public key, as an elided npub
pub fn pubkey_short(pubkey: &PublicKeyHex) -> String {
    let npub = match npub(pubkey) {
        Ok(npub) => npub,
        Err(_) => pubkey.as_str().to_owned(),
    };
    if npub.len() <= 20 {
        return npub;
    }
    format!(
        "{}...{}",
        npub.get(0..10).unwrap_or("??????????"),
        npub.get(npub.len() - 10..npub.len())
            .unwrap_or("??????????")
    )
}

/// The name to show for the author of something: display name, else handle,
/// else a short npub
pub fn author_name_ui_friendly(
    display_name: Option<&str>,
    handle: Option<&str>,
    pubkey: &PublicKeyHex,
) -> String {
    non_blank(display_name)
        .or_else(|| non_blank(handle))
        .map(|s| s.to_owned())
        .unwrap_or_else(|| pubkey_short(pubkey))
}

/// The `@name` to show for someone: handle, else a short npub
pub fn username_ui_friendly(handle: Option<&str>, pubkey: &PublicKeyHex) -> String {
    non_blank(handle)
        .map(|s| s.to_owned())
        .unwrap_or_else(|| pubkey_short(pubkey))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    fn fiatjaf() -> PublicKeyHex {
        PublicKeyHex::try_from_str(
            "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d",
        )
        .unwrap()
    }

    #[test]
    fn test_npub() {
        assert_eq!(
            npub(&fiatjaf()).unwrap(),
            "npub180cvv07tjdrrgpa0j7j7tmnyl2yr6yr7l8j4s3evf6u64th6gkwsyjh6w6"
        );
    }

    #[test]
    fn test_pubkey_short() {
        assert_eq!(pubkey_short(&fiatjaf()), "npub180cvv...gkwsyjh6w6");
    }

    #[test]
    fn test_ui_friendly_fallbacks() {
        let pk = fiatjaf();
        assert_eq!(
            author_name_ui_friendly(Some("Will"), Some("jb55"), &pk),
            "Will"
        );
        assert_eq!(author_name_ui_friendly(Some("  "), Some("jb55"), &pk), "jb55");
        assert_eq!(
            author_name_ui_friendly(None, None, &pk),
            pubkey_short(&pk)
        );
        assert_eq!(username_ui_friendly(Some("jb55"), &pk), "jb55");
        assert_eq!(username_ui_friendly(Some(""), &pk), pubkey_short(&pk));
    }
}
