use crate::error::BotResult;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Properties of one `<response>` element of a WebDAV multistatus body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DavResponse {
    pub href: String,
    pub display_name: Option<String>,
    pub is_calendar: bool,
    pub current_user_principal: Option<String>,
    pub calendar_home_set: Option<String>,
    pub calendar_data: Option<String>,
}

/// PROPFIND body asking for the current user's principal
pub const CURRENT_USER_PRINCIPAL_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:current-user-principal/>
  </d:prop>
</d:propfind>"#;

/// PROPFIND body asking for the principal's calendar home
pub const CALENDAR_HOME_SET_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <c:calendar-home-set/>
  </d:prop>
</d:propfind>"#;

/// PROPFIND body listing collections under the calendar home
pub const LIST_CALENDARS_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
    <d:displayname/>
  </d:prop>
</d:propfind>"#;

/// REPORT body fetching VEVENTs in a time range, with recurrences expanded by the server
pub fn calendar_query_request(start: &str, end: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<c:calendar-query xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <d:getetag/>
    <c:calendar-data>
      <c:expand start="{start}" end="{end}"/>
    </c:calendar-data>
  </d:prop>
  <c:filter>
    <c:comp-filter name="VCALENDAR">
      <c:comp-filter name="VEVENT">
        <c:time-range start="{start}" end="{end}"/>
      </c:comp-filter>
    </c:comp-filter>
  </c:filter>
</c:calendar-query>"#
    )
}

/// Parse a multistatus body, ignoring namespace prefixes
pub fn parse_multistatus(xml: &str) -> BotResult<Vec<DavResponse>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut responses = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<DavResponse> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                if name == "response" {
                    current = Some(DavResponse::default());
                }
                mark_calendar(&path, &name, current.as_mut());
                path.push(name);
            }
            Event::Empty(element) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                mark_calendar(&path, &name, current.as_mut());
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                apply_text(&path, current.as_mut(), &text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                apply_text(&path, current.as_mut(), &text);
            }
            Event::End(_) => {
                if path.pop().as_deref() == Some("response") {
                    if let Some(response) = current.take() {
                        responses.push(response);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(responses)
}

fn mark_calendar(path: &[String], name: &str, response: Option<&mut DavResponse>) {
    if name == "calendar" && path.last().map(String::as_str) == Some("resourcetype") {
        if let Some(response) = response {
            response.is_calendar = true;
        }
    }
}

fn apply_text(path: &[String], response: Option<&mut DavResponse>, text: &str) {
    let Some(response) = response else {
        return;
    };

    let element = path.last().map(String::as_str);
    let parent = path.len().checked_sub(2).map(|i| path[i].as_str());

    match (element, parent) {
        (Some("href"), Some("response")) => response.href.push_str(text),
        (Some("href"), Some("current-user-principal")) => {
            append(&mut response.current_user_principal, text)
        }
        (Some("href"), Some("calendar-home-set")) => append(&mut response.calendar_home_set, text),
        (Some("displayname"), _) => append(&mut response.display_name, text),
        (Some("calendar-data"), _) => append(&mut response.calendar_data, text),
        _ => {}
    }
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}
