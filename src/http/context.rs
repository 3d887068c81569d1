use crate::http::request::Request;
use crate::http::response::Response;

/// The request/response pair handed to every handler of one dispatch.
///
/// Handlers read `req` and mutate `res`. All handlers of a route share
/// the same response, so later writes append to earlier ones.
pub struct Context<'a> {
    pub req: &'a Request,
    pub res: &'a mut Response,
}

impl<'a> Context<'a> {
    pub fn new(req: &'a Request, res: &'a mut Response) -> Self {
        Self { req, res }
    }
}
