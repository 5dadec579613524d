use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::types::{Path, Segment};

// -- Segments ---------------------------------------------------------------

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !matches!(c, '.' | '[' | ']')).parse_next(input)
}

fn member(input: &mut &str) -> ModalResult<Segment> {
    name.map(|n: &str| Segment::Member(n.to_owned()))
        .context(StrContext::Expected(StrContextValue::Description(
            "member name",
        )))
        .parse_next(input)
}

fn element(input: &mut &str) -> ModalResult<Segment> {
    delimited(
        '[',
        cut_err(alt((
            '*'.value(Segment::Any),
            digit1
                .try_map(|digits: &str| digits.parse::<usize>())
                .map(Segment::Index),
        )))
        .context(StrContext::Expected(StrContextValue::Description(
            "index or '*'",
        ))),
        cut_err(']'),
    )
    .parse_next(input)
}

// -- Paths ------------------------------------------------------------------

pub(super) fn path(input: &mut &str) -> ModalResult<Path> {
    let Some(first) = opt(alt((member, element))).parse_next(input)? else {
        return Ok(Path::root());
    };
    let rest: Vec<Segment> =
        repeat(0.., alt((preceded('.', cut_err(member)), element))).parse_next(input)?;

    let mut segments = Vec::with_capacity(rest.len() + 1);
    segments.push(first);
    segments.extend(rest);
    Ok(Path::from_segments(segments))
}
