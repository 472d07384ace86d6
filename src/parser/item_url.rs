use url::Url;

use crate::error::ParsingError;

/// Item id from a listing url: the first all-digit segment after `/itm/`,
/// otherwise an all-digit `item` query parameter.
pub fn extract_item_id(listing_url: &str) -> Result<String, ParsingError> {
    let invalid = || ParsingError::InvalidUrl(listing_url.to_owned());
    let url = Url::parse(listing_url.trim()).map_err(|_| invalid())?;

    let from_path = url.path_segments().and_then(|segments| {
        segments
            .skip_while(|segment| *segment != "itm")
            .skip(1)
            .find(|segment| is_item_id(segment))
            .map(str::to_owned)
    });

    from_path
        .or_else(|| {
            url.query_pairs()
                .find(|(key, value)| key == "item" && is_item_id(value))
                .map(|(_, value)| value.into_owned())
        })
        .ok_or_else(invalid)
}

fn is_item_id(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit())
}
