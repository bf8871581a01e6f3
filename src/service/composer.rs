use crate::discovery::models::AssetSet;
use crate::models::models::{PageModel, PageTemplates, WishRequest};

const NAME_PLACEHOLDER: &str = "{name}";

/// Build the page model for a request. Pure; escaping happens at render time.
pub fn compose(request: &WishRequest, assets: AssetSet, templates: &PageTemplates) -> PageModel {
    let name_display = request.display_name().to_string();

    PageModel {
        headline_text: templates.headline.replace(NAME_PLACEHOLDER, &name_display),
        message_text: templates.message.replace(NAME_PLACEHOLDER, &name_display),
        name_display,
        assets,
    }
}
