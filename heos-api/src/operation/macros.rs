//! Declarative macro for defining SOAP actions

/// Define a SOAP action with an instance-scoped request
///
/// Generates `<Op>Request` (with an `instance_id` field alongside the
/// declared ones), the unit struct `<Op>` implementing
/// [`SoapAction`](crate::operation::SoapAction), and a snake-case
/// constructor that fills in [`INSTANCE_ID`](crate::operation::INSTANCE_ID).
///
/// # Example
/// ```rust,ignore
/// define_action! {
///     operation: Stop,
///     action: "Stop",
///     service: AVTransport,
///     request: {},
///     payload: |req| format!("<InstanceID>{}</InstanceID>", req.instance_id),
/// }
///
/// let request = stop();
/// assert_eq!(Stop::build_payload(&request), "<InstanceID>0</InstanceID>");
/// ```
#[macro_export]
macro_rules! define_action {
    (
        operation: $op_struct:ident,
        action: $action:literal,
        service: $service:ident,
        request: {
            $($field:ident: $field_type:ty),* $(,)?
        },
        payload: |$req_param:ident| $payload_expr:expr $(,)?
    ) => {
        ::paste::paste! {
            #[derive(serde::Serialize, Clone, Debug, PartialEq)]
            pub struct [<$op_struct Request>] {
                $(pub $field: $field_type,)*
                pub instance_id: u32,
            }

            pub struct $op_struct;

            impl $crate::operation::SoapAction for $op_struct {
                type Request = [<$op_struct Request>];

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const ACTION: &'static str = $action;

                fn build_payload(request: &Self::Request) -> String {
                    let $req_param = request;
                    $payload_expr
                }
            }

            pub fn [<$op_struct:snake>]($($field: $field_type),*) -> [<$op_struct Request>] {
                [<$op_struct Request>] {
                    $($field,)*
                    instance_id: $crate::operation::INSTANCE_ID,
                }
            }
        }
    };
}
