use muistutin::config::Config;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "risto";
pub const PASSWORD: &str = "salasana";
pub const BOT_TOKEN: &str = "TESTTOKEN";
pub const CHAT_ID: &str = "-1001";

/// Config pointing both the CalDAV client and the Telegram sink at the mock server
pub fn test_config(server: &MockServer) -> Config {
    Config {
        caldav_url: format!("{}/dav/", server.uri()),
        caldav_username: USERNAME.to_string(),
        caldav_password: PASSWORD.to_string(),
        calendar_ids: vec!["personal".to_string(), "work".to_string()],
        sync_interval_secs: 60,
        fetch_window_days: 5,
        telegram_bot_token: BOT_TOKEN.to_string(),
        telegram_chat_id: CHAT_ID.to_string(),
        telegram_api_url: server.uri(),
        timezone: "Europe/Helsinki".to_string(),
        bot_locale: "en".to_string(),
    }
}

fn multistatus(body: &str) -> ResponseTemplate {
    let xml = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav">{}</d:multistatus>"#,
        body
    );

    ResponseTemplate::new(207).set_body_raw(xml, "application/xml; charset=utf-8")
}

fn calendar_data_response(href: &str, ics: &str) -> String {
    format!(
        r#"<d:response>
  <d:href>{}</d:href>
  <d:propstat>
    <d:prop><cal:calendar-data>{}</cal:calendar-data></d:prop>
    <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
</d:response>"#,
        href, ics
    )
}

const TEAM_MEETING: &str = "BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:team@example.com
DTSTART:20261021T070000Z
SUMMARY:Tiimipalaveri
END:VEVENT
END:VCALENDAR";

const SAUNA: &str = "BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:sauna@example.com
DTSTART;TZID=Europe/Helsinki:20261022T180000
SUMMARY:Sauna
BEGIN:VALARM
TRIGGER:-PT30M
ACTION:DISPLAY
DESCRIPTION:Sauna
END:VALARM
END:VEVENT
END:VCALENDAR";

const PAST_MEETING: &str = "BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:past@example.com
DTSTART:20261020T060000Z
SUMMARY:Aamupalaveri
END:VEVENT
END:VCALENDAR";

const COTTAGE_WEEKEND: &str = "BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:cottage@example.com
DTSTART;VALUE=DATE:20261024
SUMMARY:Mökkiviikonloppu
END:VEVENT
END:VCALENDAR";

/// Mount principal discovery, calendar listing and event reports
pub async fn mount_caldav(server: &MockServer) {
    Mock::given(method("PROPFIND"))
        .and(path("/dav/"))
        .and(header("Depth", "0"))
        .and(basic_auth(USERNAME, PASSWORD))
        .respond_with(multistatus(
            r#"<d:response>
  <d:href>/dav/</d:href>
  <d:propstat>
    <d:prop>
      <d:current-user-principal><d:href>/dav/principals/risto/</d:href></d:current-user-principal>
    </d:prop>
    <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
</d:response>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/principals/risto/"))
        .respond_with(multistatus(
            r#"<d:response>
  <d:href>/dav/principals/risto/</d:href>
  <d:propstat>
    <d:prop>
      <cal:calendar-home-set><d:href>/dav/calendars/risto/</d:href></cal:calendar-home-set>
    </d:prop>
    <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
</d:response>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/risto/"))
        .and(header("Depth", "1"))
        .respond_with(multistatus(
            r#"<d:response>
  <d:href>/dav/calendars/risto/</d:href>
  <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop></d:propstat>
</d:response>
<d:response>
  <d:href>/dav/calendars/risto/personal/</d:href>
  <d:propstat>
    <d:prop>
      <d:resourcetype><d:collection/><cal:calendar/></d:resourcetype>
      <d:displayname>Personal</d:displayname>
    </d:prop>
  </d:propstat>
</d:response>
<d:response>
  <d:href>/dav/calendars/risto/work/</d:href>
  <d:propstat>
    <d:prop>
      <d:resourcetype><d:collection/><cal:calendar/></d:resourcetype>
      <d:displayname>Work</d:displayname>
    </d:prop>
  </d:propstat>
</d:response>
<d:response>
  <d:href>/dav/calendars/risto/birthdays/</d:href>
  <d:propstat>
    <d:prop>
      <d:resourcetype><d:collection/><cal:calendar/></d:resourcetype>
      <d:displayname>Birthdays</d:displayname>
    </d:prop>
  </d:propstat>
</d:response>
<d:response>
  <d:href>/dav/calendars/risto/inbox/</d:href>
  <d:propstat><d:prop><d:resourcetype><d:collection/><cal:schedule-inbox/></d:resourcetype></d:prop></d:propstat>
</d:response>"#,
        ))
        .mount(server)
        .await;

    let personal = [
        calendar_data_response("/dav/calendars/risto/personal/team.ics", TEAM_MEETING),
        calendar_data_response("/dav/calendars/risto/personal/sauna.ics", SAUNA),
    ]
    .concat();
    Mock::given(method("REPORT"))
        .and(path("/dav/calendars/risto/personal/"))
        .respond_with(multistatus(&personal))
        .mount(server)
        .await;

    let work = [
        calendar_data_response("/dav/calendars/risto/work/team.ics", TEAM_MEETING),
        calendar_data_response("/dav/calendars/risto/work/past.ics", PAST_MEETING),
        calendar_data_response("/dav/calendars/risto/work/cottage.ics", COTTAGE_WEEKEND),
    ]
    .concat();
    Mock::given(method("REPORT"))
        .and(path("/dav/calendars/risto/work/"))
        .respond_with(multistatus(&work))
        .mount(server)
        .await;
}
