//! Parse problems from text

use crate::csp::{validate_variables, Constraint, Variable};
use crate::error::{ParseError, ParseErrorType::*, ParseProblemError, UNEXPECTED_END};
use crate::expr::parse::{IndexedToken, Keyword, Symbol, Token, TokenIterator};
use crate::expr::Value;
use crate::problem::Problem;

type Result<T> = std::result::Result<T, ParseError>;

const VARIABLE_DIRECTIVE: &str = "var";
const CONSTRAINT_DIRECTIVE: &str = "constraint";

/// parse a `Problem` from a string
pub(crate) fn parse_problem(s: &str) -> std::result::Result<Problem, ParseProblemError> {
    let mut problem = Problem::new();
    for (i, line) in s.lines().enumerate() {
        parse_line(&mut problem, line).map_err(|source| ParseProblemError::Line {
            line: i + 1,
            source,
        })?;
    }
    validate_variables(&problem.variables)?;
    Ok(problem)
}

fn parse_line(problem: &mut Problem, line: &str) -> Result<()> {
    let line = strip_comment(line);
    let start = match line.find(|c: char| !c.is_whitespace()) {
        Some(start) => start,
        None => return Ok(()),
    };
    let end = line[start..]
        .find(char::is_whitespace)
        .map_or(line.len(), |i| start + i);
    let directive = &line[start..end];
    let rest = &line[end..];
    match directive {
        VARIABLE_DIRECTIVE => {
            let variable = parse_variable(rest).map_err(|e| e.offset(end))?;
            problem.add_variable(variable);
        }
        CONSTRAINT_DIRECTIVE => {
            let offset = end + leading_space(rest);
            let constraint = Constraint::new(rest.trim()).map_err(|e| e.offset(offset))?;
            problem.constraints.push(constraint);
        }
        _ => return Err(ParseError::new(UnknownDirective, directive, start)),
    }
    Ok(())
}

/// The line up to a `#` that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return &line[..i],
            None => {}
        }
    }
    line
}

fn leading_space(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// `NAME: VALUE...`
fn parse_variable(s: &str) -> Result<Variable> {
    let colon = s
        .find(':')
        .ok_or_else(|| ParseError::new(InvalidVariable, s.trim(), leading_space(s)))?;
    let name = s[..colon].trim();
    if !is_identifier(name) {
        return Err(ParseError::new(InvalidVariable, name, leading_space(s)));
    }
    let offset = colon + 1;
    let domain = parse_domain(&s[offset..]).map_err(|e| e.offset(offset))?;
    Ok(Variable::new(name, domain))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Space-separated values. `a..b` is the half-open range of integers from `a` to `b`.
fn parse_domain(s: &str) -> Result<Vec<Value>> {
    let tokens = TokenIterator::new(s).collect_tokens()?;
    let mut tokens = tokens.into_iter().peekable();
    let mut domain = Vec::new();
    while let Some((i, token)) = tokens.next() {
        match token {
            Token::Int(_) | Token::Symbol(Symbol::Minus) => {
                let start = read_int(i, token, &mut tokens)?;
                if tokens.peek().and_then(|(_, t)| t.symbol()) == Some(Symbol::Dot) {
                    tokens.next();
                    expect_dot(&mut tokens)?;
                    let (j, token) = tokens.next().ok_or(UNEXPECTED_END)?;
                    let end = read_int(j, token, &mut tokens)?;
                    if end < start {
                        return Err(ParseError::new(InvalidDomain, format!("{}..{}", start, end), i));
                    }
                    domain.extend((start..end).map(Value::Int));
                } else {
                    domain.push(Value::Int(start));
                }
            }
            Token::Str(s) => domain.push(Value::Str(s)),
            Token::Keyword(Keyword::True) => domain.push(Value::Bool(true)),
            Token::Keyword(Keyword::False) => domain.push(Value::Bool(false)),
            t => return Err(ParseError::new(UnexpectedToken, t, i)),
        }
    }
    Ok(domain)
}

/// An integer with an optional minus sign
fn read_int(
    i: usize,
    token: Token,
    tokens: &mut impl Iterator<Item = IndexedToken>,
) -> Result<i64> {
    match token {
        Token::Int(n) => Ok(n),
        Token::Symbol(Symbol::Minus) => match tokens.next() {
            Some((_, Token::Int(n))) => Ok(-n),
            Some((j, t)) => Err(ParseError::new(UnexpectedToken, t, j)),
            None => Err(UNEXPECTED_END),
        },
        t => Err(ParseError::new(UnexpectedToken, t, i)),
    }
}

fn expect_dot(tokens: &mut impl Iterator<Item = IndexedToken>) -> Result<()> {
    match tokens.next() {
        Some((_, Token::Symbol(Symbol::Dot))) => Ok(()),
        Some((j, t)) => Err(ParseError::new(UnexpectedToken, t, j)),
        None => Err(UNEXPECTED_END),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_problem;
    use crate::error::{ParseError, ParseErrorType, ParseProblemError, SetupError};
    use crate::expr::Value;

    #[test]
    fn parse() {
        let s = "\
# potions
var p1: \"wine\" 'poison'  # two values
var Q0: 0..4
var n: -2 -1 3

constraint p1 != \"#\" and Q0 > n
";
        let problem = parse_problem(s).unwrap();
        let variables = problem.variables();
        assert_eq!(3, variables.len());
        assert_eq!("p1", variables[0].name());
        assert_eq!(
            &[Value::from("wine"), Value::from("poison")],
            variables[0].domain()
        );
        assert_eq!(
            &[Value::Int(0), Value::Int(1), Value::Int(2), Value::Int(3)],
            variables[1].domain()
        );
        assert_eq!(
            &[Value::Int(-2), Value::Int(-1), Value::Int(3)],
            variables[2].domain()
        );
        assert_eq!(1, problem.constraints().len());
        assert_eq!(
            "p1 != \"#\" and Q0 > n",
            problem.constraints()[0].source()
        );
    }

    fn line_error(s: &str) -> (usize, ParseError) {
        match parse_problem(s) {
            Err(ParseProblemError::Line { line, source }) => (line, source),
            other => panic!("expected a line error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn errors() {
        let (line, e) = line_error("var A: 0 1\nvariable B: 0");
        assert_eq!(2, line);
        assert_eq!(ParseError::new(ParseErrorType::UnknownDirective, "variable", 0), e);

        let (line, e) = line_error("var A 0 1");
        assert_eq!(1, line);
        assert_eq!(ParseErrorType::InvalidVariable, e.error_type());

        let (_, e) = line_error("var A: 0 +");
        assert_eq!(ParseError::new(ParseErrorType::UnexpectedToken, "+", 9), e);

        let (_, e) = line_error("var A: 3..1");
        assert_eq!(ParseErrorType::InvalidDomain, e.error_type());

        let (_, e) = line_error("constraint A ==");
        assert_eq!(ParseErrorType::UnexpectedEnd, e.error_type());

        let (_, e) = line_error("constraint A == )");
        assert_eq!(ParseError::new(ParseErrorType::UnexpectedToken, ")", 16), e);
    }

    #[test]
    fn duplicate_variable() {
        let result = parse_problem("var A: 0\nvar A: 1");
        assert!(matches!(
            result,
            Err(ParseProblemError::Setup(SetupError::DuplicateVariable(_)))
        ));
    }
}
