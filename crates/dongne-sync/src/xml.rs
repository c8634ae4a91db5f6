//! Typed schema for the MOLIT `getRTMSDataSvcAptTrade` XML response.
//!
//! ```xml
//! <response>
//!   <header><resultCode>000</resultCode><resultMsg>OK</resultMsg></header>
//!   <body>
//!     <items><item>...</item><item>...</item></items>
//!     <numOfRows>100</numOfRows><pageNo>1</pageNo><totalCount>2</totalCount>
//!   </body>
//! </response>
//! ```
//!
//! The data.go.kr gateway reports key and quota problems with a different
//! envelope (`OpenAPI_ServiceResponse/cmmMsgHeader`); both are handled here so
//! callers only see records or a [`RegistryError`].

use dongne_core::RawRegistryRecord;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::RegistryError;

#[derive(Debug, Deserialize)]
struct Envelope {
    header: Option<Header>,
    body: Option<Body>,
    #[serde(rename = "cmmMsgHeader")]
    gateway: Option<GatewayHeader>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "resultCode", default)]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct GatewayHeader {
    #[serde(rename = "errMsg", default)]
    err_msg: String,
    #[serde(rename = "returnAuthMsg", default)]
    return_auth_msg: String,
    #[serde(rename = "returnReasonCode", default)]
    return_reason_code: String,
}

#[derive(Debug, Deserialize)]
struct Body {
    items: Option<Items>,
    #[serde(rename = "totalCount")]
    total_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct Items {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

/// One `<item>`. Only `aptNm` and `dealAmount` are required.
#[derive(Debug, Default, Deserialize)]
struct Item {
    #[serde(rename = "aptNm")]
    apt_nm: Option<String>,
    #[serde(rename = "excluUseAr")]
    exclu_use_ar: Option<String>,
    floor: Option<String>,
    #[serde(rename = "dealAmount")]
    deal_amount: Option<String>,
    #[serde(rename = "dealYear")]
    deal_year: Option<String>,
    #[serde(rename = "dealMonth")]
    deal_month: Option<String>,
    #[serde(rename = "dealDay")]
    deal_day: Option<String>,
    #[serde(rename = "buildYear")]
    build_year: Option<String>,
    #[serde(rename = "umdNm")]
    umd_nm: Option<String>,
}

impl Item {
    fn into_record(self) -> Result<RawRegistryRecord, &'static str> {
        fn text(v: Option<String>) -> String {
            v.map(|s| s.trim().to_string()).unwrap_or_default()
        }
        let apartment_name = text(self.apt_nm);
        if apartment_name.is_empty() {
            return Err("aptNm");
        }
        let amount = text(self.deal_amount);
        if amount.is_empty() {
            return Err("dealAmount");
        }
        Ok(RawRegistryRecord {
            apartment_name,
            area: text(self.exclu_use_ar),
            floor: text(self.floor),
            amount,
            deal_year: text(self.deal_year),
            deal_month: text(self.deal_month),
            deal_day: text(self.deal_day),
            build_year: text(self.build_year),
            neighborhood: text(self.umd_nm),
        })
    }
}

/// One parsed page.
#[derive(Debug, Default)]
pub struct RegistryPage {
    pub records: Vec<RawRegistryRecord>,
    /// Number of `<item>` nodes on the page, including skipped ones.
    pub item_count: usize,
    pub total_count: Option<u32>,
}

/// Result codes the registry uses for success (`00` on the legacy API).
const SUCCESS_CODES: &[&str] = &["00", "000"];

/// `NODATA_ERROR`: the month simply has no trades.
const NO_DATA_CODE: &str = "03";

/// Parse one registry page.
///
/// A missing `<items>` (or an empty one) and a `03` result code are a page
/// with no records. Items lacking a required field are logged and skipped.
pub fn parse_page(xml: &str) -> Result<RegistryPage, RegistryError> {
    let envelope: Envelope =
        quick_xml::de::from_str(xml).map_err(|e| RegistryError::Xml(e.to_string()))?;

    if let Some(gw) = envelope.gateway {
        let message = [gw.return_auth_msg, gw.err_msg]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(": ");
        return Err(RegistryError::Api {
            code: gw.return_reason_code,
            message,
        });
    }

    if let Some(header) = envelope.header {
        let code = header.result_code.trim();
        if code == NO_DATA_CODE {
            debug!(message = header.result_msg.trim(), "registry reports no data");
            return Ok(RegistryPage::default());
        }
        if !code.is_empty() && !SUCCESS_CODES.contains(&code) {
            return Err(RegistryError::Api {
                code: code.to_string(),
                message: header.result_msg.trim().to_string(),
            });
        }
    }

    let Some(body) = envelope.body else {
        return Ok(RegistryPage::default());
    };
    let items = body.items.unwrap_or_default().item;
    let item_count = items.len();
    let mut records = Vec::with_capacity(item_count);
    for (idx, item) in items.into_iter().enumerate() {
        match item.into_record() {
            Ok(record) => records.push(record),
            Err(field) => warn!(idx, field, "skipping registry item with missing field"),
        }
    }

    Ok(RegistryPage {
        records,
        item_count,
        total_count: body.total_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(apt: &str, amount: &str) -> String {
        format!(
            "<item>\
               <aptNm>{apt}</aptNm><buildYear>2003</buildYear>\
               <dealAmount>{amount}</dealAmount><dealDay>7</dealDay>\
               <dealMonth>1</dealMonth><dealYear>2025</dealYear>\
               <excluUseAr>84.97</excluUseAr><floor>5</floor>\
               <sggCd>28200</sggCd><umdNm>논현동</umdNm>\
             </item>"
        )
    }

    fn response(items: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <response>\
               <header><resultCode>000</resultCode><resultMsg>OK</resultMsg></header>\
               <body><items>{items}</items>\
               <numOfRows>100</numOfRows><pageNo>1</pageNo><totalCount>2</totalCount></body>\
             </response>"
        )
    }

    #[test]
    fn parses_many_items() {
        let xml = response(&(item("논현주공", "50,000") + &item("에코메트로", "  62,500")));
        let page = parse_page(&xml).unwrap();
        assert_eq!(page.item_count, 2);
        assert_eq!(page.total_count, Some(2));
        assert_eq!(page.records[0].apartment_name, "논현주공");
        assert_eq!(page.records[0].area, "84.97");
        assert_eq!(page.records[0].neighborhood, "논현동");
        assert_eq!(page.records[1].amount, "62,500");
    }

    #[test]
    fn single_item_is_a_one_element_page() {
        let page = parse_page(&response(&item("논현주공", "50,000"))).unwrap();
        assert_eq!(page.item_count, 1);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].deal_month, "1");
    }

    #[test]
    fn empty_items_is_no_data() {
        let page = parse_page(&response("")).unwrap();
        assert_eq!(page.item_count, 0);
        assert!(page.records.is_empty());
    }

    #[test]
    fn missing_body_is_no_data() {
        let xml = "<response><header><resultCode>000</resultCode>\
                   <resultMsg>OK</resultMsg></header></response>";
        let page = parse_page(xml).unwrap();
        assert!(page.records.is_empty());
    }

    #[test]
    fn item_missing_required_field_is_skipped() {
        let broken = "<item><excluUseAr>59</excluUseAr><umdNm>논현동</umdNm></item>";
        let xml = response(&(item("논현주공", "50,000") + broken));
        let page = parse_page(&xml).unwrap();
        assert_eq!(page.item_count, 2);
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn no_data_code_is_empty_page() {
        let xml = "<response><header><resultCode>03</resultCode>\
                   <resultMsg>NODATA_ERROR</resultMsg></header></response>";
        let page = parse_page(xml).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.item_count, 0);
    }

    #[test]
    fn error_result_code() {
        let xml = "<response><header><resultCode>30</resultCode>\
                   <resultMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</resultMsg></header></response>";
        match parse_page(xml) {
            Err(RegistryError::Api { code, message }) => {
                assert_eq!(code, "30");
                assert_eq!(message, "SERVICE_KEY_IS_NOT_REGISTERED_ERROR");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn gateway_error_envelope() {
        let xml = "<OpenAPI_ServiceResponse><cmmMsgHeader>\
                   <errMsg>SERVICE ERROR</errMsg>\
                   <returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg>\
                   <returnReasonCode>30</returnReasonCode>\
                   </cmmMsgHeader></OpenAPI_ServiceResponse>";
        match parse_page(xml) {
            Err(RegistryError::Api { code, message }) => {
                assert_eq!(code, "30");
                assert!(message.starts_with("SERVICE_KEY_IS_NOT_REGISTERED_ERROR"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_an_xml_error() {
        assert!(matches!(
            parse_page("<response><body><items><item>"),
            Err(RegistryError::Xml(_))
        ));
    }
}
