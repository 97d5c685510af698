pub(crate) const DEFAULT_USER_AGENT: &str = concat!("barrage/", env!("CARGO_PKG_VERSION"));

/// Config filenames checked when `--config` is not given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["barrage.toml", "barrage.json"];

pub(super) const DEFAULT_PATH: &str = "/notifications";

pub(super) const DEFAULT_PAYLOAD: &str = r#"{"version":"1.0.0","scheduled":false,"channel":"MOBILE","product":"SOUNDS","type":"MOBILE_ALERT","collapse_key":"6493f88c-1b12-56d2-bf04-9521f92fe62b","data":{"cid":"Cid156350s20s","URL":"Url15615593d0020"},"notification":{"alert":{"body":"Body15615593500201","title":"Title1561559350020"},"badge":"2","image":null,"interaction":{"category":"category"},"sound":"Sound1561559350s020","video":{"vpid":"p05fchjx"},"notificationTag":"6493f88c-1b12-56d2-bf04-9521f92fe62b"},"user_id":"510bc8e6-d91a-448c-b2e2-16cdc30f72d3","devices":["IOS","ANDROID","AMAZON"]}"#;
