use ::url::Url;

use super::{Decode, Encode};
use crate::de::Decoder;
use crate::error::Result;
use crate::node::Node;
use crate::ser::Encoder;

impl Encode for Url {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.str(self.as_str())
    }
}

/// An empty value leaves the URL untouched, since `Url` has no empty form.
impl Decode for Url {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        let text = decoder.text()?;
        if text.is_empty() {
            return Ok(());
        }
        *self = Url::parse(text).map_err(|e| decoder.parse_error(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Error, from_str, record, to_string};

    record! {
        #[derive(Debug, Default)]
        struct Link {
            href: Option<Url>,
        }
    }

    #[test]
    fn url_is_written_as_text() {
        let link = Link {
            href: Some(Url::parse("https://example.com/a?b=c").unwrap()),
        };
        assert_eq!(to_string(&link).unwrap(), "href=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc");
    }

    #[test]
    fn url_is_parsed() {
        let link: Link = from_str("href=https%3A%2F%2Fexample.com%2F").unwrap();
        assert_eq!(link.href.unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn invalid_url_names_the_key() {
        let err = from_str::<Link>("href=not+a+url").unwrap_err();
        assert!(matches!(err, Error::Parse { ref key, .. } if key == "href"), "got: {err}");
    }
}
