//! Minimal SOAP 1.1 binding of the tax service.
//!
//! Only the document/literal wrapped shape of `calculatePersonalIncomeTax`
//! is understood: `Envelope/Body/calculatePersonalIncomeTax/id`. Element
//! prefixes are ignored and matched by local name. Anything else is answered
//! with a `soap:Client` fault.

use axum::Router;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use taxcalc::facade::{CalculateRequest, OPERATION_NAME};

use crate::state::AppState;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Wire name of the gross income parameter.
const PARAM_NAME: &[u8] = b"id";

/// Build the SOAP router mounted at `path`.
pub fn soap_router(path: &str) -> Router<AppState> {
    Router::new().route(path, axum::routing::get(wsdl).post(invoke))
}

/// SOAP fault reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    pub code: FaultCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// The request was malformed or named something we do not serve.
    Client,
}

impl FaultCode {
    fn as_str(self) -> &'static str {
        match self {
            FaultCode::Client => "soap:Client",
        }
    }
}

impl SoapFault {
    fn client(message: impl Into<String>) -> Self {
        Self {
            code: FaultCode::Client,
            message: message.into(),
        }
    }

    fn to_envelope(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<soap:Envelope xmlns:soap="{env}"><soap:Body><soap:Fault>"#,
                "<faultcode>{code}</faultcode><faultstring>{message}</faultstring>",
                "</soap:Fault></soap:Body></soap:Envelope>"
            ),
            env = SOAP_ENV_NS,
            code = self.code.as_str(),
            message = escape(self.message.as_str()),
        )
    }
}

impl IntoResponse for SoapFault {
    fn into_response(self) -> Response {
        // SOAP 1.1 carries every fault with HTTP 500.
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
            self.to_envelope(),
        )
            .into_response()
    }
}

/// POST {soap_path} - decode envelope, call the service, encode the answer.
async fn invoke(State(state): State<AppState>, body: String) -> Result<Response, SoapFault> {
    let request = parse_request(&body).inspect_err(|fault| {
        warn!(message = %fault.message, "rejecting SOAP request");
    })?;
    let response = state.service.handle(request);
    debug!(
        gross_income = request.gross_income,
        tax = response.tax,
        "soap call"
    );

    let envelope = render_response(&state.config.soap.target_namespace, response.tax);
    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], envelope).into_response())
}

/// GET {soap_path}?wsdl - service description.
async fn wsdl(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if !wants_wsdl(query.as_deref()) {
        return (
            StatusCode::BAD_REQUEST,
            "use POST for calls or GET ?wsdl for the service description",
        )
            .into_response();
    }
    let host = request_authority(&headers, &uri);
    let location = state.soap_location(host.as_deref());
    (
        [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
        render_wsdl(&state, &location),
    )
        .into_response()
}

/// Authority the caller addressed: `Host` header, else the request URI
/// (HTTP/2 carries it there). Values that are not a bare `host[:port]` are
/// ignored.
fn request_authority(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .map(str::trim)
        .filter(|host| is_plain_authority(host))
        .map(str::to_string)
}

fn is_plain_authority(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']' | '_'))
}

fn wants_wsdl(query: Option<&str>) -> bool {
    query.is_some_and(|q| {
        q.split('&').any(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            key.eq_ignore_ascii_case("wsdl")
        })
    })
}

/// Extract the gross income from a `calculatePersonalIncomeTax` envelope.
pub fn parse_request(xml: &str) -> Result<CalculateRequest, SoapFault> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Local names of currently open elements, outermost first.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut saw_body = false;
    let mut operation: Option<Vec<u8>> = None;
    let mut param: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|err| {
            SoapFault::client(format!(
                "malformed XML at byte {}: {err}",
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(start) => {
                let name = start.local_name().as_ref().to_vec();
                open_element(&stack, &name, &mut saw_body, &mut operation, &mut param)?;
                stack.push(name);
            }
            Event::Empty(empty) => {
                let name = empty.local_name().as_ref().to_vec();
                open_element(&stack, &name, &mut saw_body, &mut operation, &mut param)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) if in_param(&stack) => {
                let text = text
                    .unescape()
                    .map_err(|err| SoapFault::client(format!("bad parameter text: {err}")))?;
                param.get_or_insert_with(String::new).push_str(&text);
            }
            Event::CData(data) if in_param(&stack) => {
                param
                    .get_or_insert_with(String::new)
                    .push_str(&String::from_utf8_lossy(&data));
            }
            Event::Eof => {
                if let Some(open) = stack.last() {
                    return Err(SoapFault::client(format!(
                        "truncated envelope: '{}' is never closed",
                        String::from_utf8_lossy(open)
                    )));
                }
                break;
            }
            _ => {}
        }
    }

    if !saw_body {
        return Err(SoapFault::client("missing soap:Body"));
    }
    if operation.is_none() {
        return Err(SoapFault::client("soap:Body has no operation element"));
    }
    let raw = param.ok_or_else(|| {
        SoapFault::client(format!("{OPERATION_NAME} requires an 'id' parameter"))
    })?;
    let gross_income = parse_double(&raw)
        .ok_or_else(|| SoapFault::client(format!("'{}' is not a valid xs:double", raw.trim())))?;
    Ok(CalculateRequest { gross_income })
}

fn open_element(
    stack: &[Vec<u8>],
    name: &[u8],
    saw_body: &mut bool,
    operation: &mut Option<Vec<u8>>,
    param: &mut Option<String>,
) -> Result<(), SoapFault> {
    match stack.len() {
        0 if name != b"Envelope" => Err(SoapFault::client(format!(
            "root element must be soap:Envelope, found '{}'",
            String::from_utf8_lossy(name)
        ))),
        1 if name == b"Body" => {
            if *saw_body {
                return Err(SoapFault::client("envelope has more than one soap:Body"));
            }
            *saw_body = true;
            Ok(())
        }
        2 if stack[1] == b"Body" => {
            if operation.is_some() {
                return Err(SoapFault::client(format!(
                    "soap:Body must hold exactly one operation element, found extra '{}'",
                    String::from_utf8_lossy(name)
                )));
            }
            if name != OPERATION_NAME.as_bytes() {
                return Err(SoapFault::client(format!(
                    "unknown operation '{}'",
                    String::from_utf8_lossy(name)
                )));
            }
            *operation = Some(name.to_vec());
            Ok(())
        }
        3 if stack[1] == b"Body" => {
            if name != PARAM_NAME {
                return Err(SoapFault::client(format!(
                    "unexpected element '{}' in {OPERATION_NAME}",
                    String::from_utf8_lossy(name)
                )));
            }
            if param.is_some() {
                return Err(SoapFault::client(format!(
                    "{OPERATION_NAME} takes a single 'id' parameter"
                )));
            }
            // `<id/>` still counts as present; the empty value fails to parse.
            *param = Some(String::new());
            Ok(())
        }
        _ => Ok(()),
    }
}

fn in_param(stack: &[Vec<u8>]) -> bool {
    stack.len() == 4
        && stack[1] == b"Body"
        && stack[2] == OPERATION_NAME.as_bytes()
        && stack[3] == PARAM_NAME
}

/// Parse the xs:double lexical space (`INF`, `-INF`, `NaN` included).
///
/// Rust's float parser also takes `inf`, `infinity` and `nan` in any case;
/// those are outside xs:double, so only decimal digits, signs, the point
/// and an exponent marker reach it.
fn parse_double(raw: &str) -> Option<f64> {
    match raw.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other if other.bytes().all(is_decimal_byte) => other.parse().ok(),
        _ => None,
    }
}

fn is_decimal_byte(byte: u8) -> bool {
    byte.is_ascii_digit() || matches!(byte, b'+' | b'-' | b'.' | b'e' | b'E')
}

/// Render an f64 in the xs:double lexical space.
fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "INF".to_string()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        value.to_string()
    }
}

fn render_response(target_namespace: &str, tax: f64) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soap:Envelope xmlns:soap="{env}"><soap:Body>"#,
            r#"<ns2:{op}Response xmlns:ns2="{tns}"><return>{tax}</return></ns2:{op}Response>"#,
            "</soap:Body></soap:Envelope>"
        ),
        env = SOAP_ENV_NS,
        op = OPERATION_NAME,
        tns = escape(target_namespace),
        tax = format_double(tax),
    )
}

fn render_wsdl(state: &AppState, location: &str) -> String {
    let names = &state.config.soap;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions name="{service}" targetNamespace="{tns}"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:tns="{tns}">
  <wsdl:types>
    <xs:schema targetNamespace="{tns}" elementFormDefault="unqualified">
      <xs:element name="{op}" type="tns:{op}"/>
      <xs:element name="{op}Response" type="tns:{op}Response"/>
      <xs:complexType name="{op}">
        <xs:sequence><xs:element name="id" type="xs:double"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="{op}Response">
        <xs:sequence><xs:element name="return" type="xs:double"/></xs:sequence>
      </xs:complexType>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="{op}">
    <wsdl:part name="parameters" element="tns:{op}"/>
  </wsdl:message>
  <wsdl:message name="{op}Response">
    <wsdl:part name="parameters" element="tns:{op}Response"/>
  </wsdl:message>
  <wsdl:portType name="{port_type}">
    <wsdl:operation name="{op}">
      <wsdl:input name="{op}" message="tns:{op}"/>
      <wsdl:output name="{op}Response" message="tns:{op}Response"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="{service}SoapBinding" type="tns:{port_type}">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="{op}">
      <soap:operation soapAction="" style="document"/>
      <wsdl:input name="{op}"><soap:body use="literal"/></wsdl:input>
      <wsdl:output name="{op}Response"><soap:body use="literal"/></wsdl:output>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="{service}">
    <wsdl:port name="{port}" binding="tns:{service}SoapBinding">
      <soap:address location="{location}"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>
"#,
        service = escape(names.service_name.as_str()),
        port = escape(names.port_name.as_str()),
        port_type = escape(names.port_type.as_str()),
        tns = escape(names.target_namespace.as_str()),
        location = escape(location),
        op = OPERATION_NAME,
    )
}
