use std::{fs::File, iter::Peekable};

use libyaml::{Encoding, Event, Parser, ParserIter};

use crate::{
    parser::RuleKind,
    test::{ExpectedFailure, RuleDefinition, Test, TestSuite},
};

type YAMLEventError = Option<Result<Event, libyaml::ParserError>>;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Scalar expected, got {0:?}")]
    ScalarExpected(YAMLEventError),
    #[error("YAML parse error")]
    YAMLError(#[from] libyaml::ParserError),
    #[error("Stream start expected")]
    StreamStartExpected,
    #[error("Stream end expected")]
    StreamEndExpected,
    #[error("Document start expected")]
    DocumentStartExpected,
    #[error("Document end expected")]
    DocumentEndExpected,
    #[error("Sequence start expected")]
    SequenceStartExpected,
    #[error("Sequence end expected, got {0:?}")]
    SequenceEndExpected(YAMLEventError),
    #[error("Mapping start expected, got {0:?}")]
    MappingStartExpected(YAMLEventError),
    #[error("Mapping end expected")]
    MappingEndExpected,
    #[error("Encoding {0:?} not supported")]
    InvalidEncoding(Encoding),
    #[error("Invalid rule kind {0:?}")]
    InvalidKind(String),
    #[error("Invalid xfail value")]
    InvalidXFail,
    #[error("Invalid token {0:?}")]
    InvalidToken(String),
    #[error("Rules without pairs")]
    PairsExpected,
    #[error("Tests without preceding rules")]
    RulesExpected,
}

pub struct YAMLParser<'a> {
    events: Peekable<ParserIter<'a>>,
}

impl<'a> YAMLParser<'a> {
    pub fn new(reader: File) -> Result<Self, ParseError> {
        let parser = Parser::new(reader)?;
        Ok(Self {
            events: parser.into_iter().peekable(),
        })
    }

    fn scalar(&mut self) -> Result<String, ParseError> {
        match self.events.next() {
            Some(Ok(Event::Scalar { value, .. })) => Ok(value),
            e => Err(ParseError::ScalarExpected(e)),
        }
    }

    fn mapping_start(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::MappingStart { .. })) => Ok(()),
            e => Err(ParseError::MappingStartExpected(e)),
        }
    }

    fn mapping_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::MappingEnd)) => Ok(()),
            _ => Err(ParseError::MappingEndExpected),
        }
    }

    fn sequence_start(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::SequenceStart { .. })) => Ok(()),
            _ => Err(ParseError::SequenceStartExpected),
        }
    }

    fn sequence_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::SequenceEnd)) => Ok(()),
            e => Err(ParseError::SequenceEndExpected(e)),
        }
    }

    fn scalars(&mut self) -> Result<Vec<String>, ParseError> {
        self.sequence_start()?;
        let mut values = Vec::new();
        while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            values.push(self.scalar()?);
        }
        self.sequence_end()?;
        Ok(values)
    }

    fn kind(&mut self) -> Result<RuleKind, ParseError> {
        let value = self.scalar()?;
        value.parse().map_err(|_| ParseError::InvalidKind(value))
    }

    fn rules(&mut self) -> Result<RuleDefinition, ParseError> {
        let mut pairs = Vec::new();
        let mut contexts = Vec::new();
        let mut kind = None;
        let mut prefix = None;
        self.mapping_start()?;
        while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            let value = self.scalar()?;
            match &*value {
                "pairs" => {
                    pairs = self.scalars()?;
                }
                "contexts" => {
                    contexts = self.scalars()?;
                }
                "kind" => {
                    kind = Some(self.kind()?);
                }
                "prefix" => {
                    prefix = Some(self.scalar()?);
                }
                _ => {
                    return Err(ParseError::InvalidToken(value));
                }
            }
        }
        self.mapping_end()?;
        if pairs.is_empty() {
            return Err(ParseError::PairsExpected);
        }
        Ok(RuleDefinition::new(pairs, contexts, kind, prefix))
    }

    fn xfail(&mut self) -> Result<ExpectedFailure, ParseError> {
        match self.events.peek() {
            Some(Ok(Event::Scalar { .. })) => {
                let value = self.scalar()?;
                match &*value {
                    "off" | "false" | "no" => Ok(ExpectedFailure::Simple(false)),
                    "on" | "true" | "yes" => Ok(ExpectedFailure::Simple(true)),
                    _ => Ok(ExpectedFailure::Reason(value)),
                }
            }
            _ => Err(ParseError::InvalidXFail),
        }
    }

    fn test(&mut self) -> Result<Test, ParseError> {
        self.sequence_start()?;
        let mut description = None;
        let mut input = self.scalar()?;
        let mut expected = self.scalar()?;
        // two scalars are input and expected, three are description, input and expected
        if let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            description = Some(input);
            input = expected;
            expected = self.scalar()?;
        }
        let mut xfail = ExpectedFailure::Simple(false);
        if let Some(Ok(Event::MappingStart { .. })) = self.events.peek() {
            self.mapping_start()?;
            while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
                let value = self.scalar()?;
                match &*value {
                    "xfail" => {
                        xfail = self.xfail()?;
                    }
                    _ => {
                        return Err(ParseError::InvalidToken(value));
                    }
                }
            }
            self.mapping_end()?;
        };
        self.sequence_end()?;
        Ok(Test::new(description, input, expected, xfail))
    }

    fn tests(&mut self) -> Result<Vec<Test>, ParseError> {
        let mut tests: Vec<Test> = Vec::new();
        self.sequence_start()?;
        while let Some(Ok(Event::SequenceStart { .. })) = self.events.peek() {
            tests.push(self.test()?);
        }
        self.sequence_end()?;
        Ok(tests)
    }

    fn stream_start(&mut self) -> Result<(), ParseError> {
        if let Some(Ok(Event::StreamStart {
            encoding: Some(encoding),
        })) = self.events.next()
        {
            if encoding == Encoding::Utf8 {
                Ok(())
            } else {
                Err(ParseError::InvalidEncoding(encoding))
            }
        } else {
            Err(ParseError::StreamStartExpected)
        }
    }

    fn stream_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::StreamEnd)) => Ok(()),
            _ => Err(ParseError::StreamEndExpected),
        }
    }

    fn document_start(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::DocumentStart { .. })) => Ok(()),
            _ => Err(ParseError::DocumentStartExpected),
        }
    }

    fn document_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::DocumentEnd { .. })) => Ok(()),
            _ => Err(ParseError::DocumentEndExpected),
        }
    }

    /// Parse a test file. Every `tests` key closes a suite with the `rules` seen last.
    pub fn yaml(&mut self) -> Result<Vec<TestSuite>, ParseError> {
        let mut test_suites: Vec<TestSuite> = Vec::new();
        let mut rules: Option<RuleDefinition> = None;

        self.stream_start()?;
        self.document_start()?;
        self.mapping_start()?;
        while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            let value = self.scalar()?;
            match &*value {
                "rules" => {
                    rules = Some(self.rules()?);
                }
                "tests" => {
                    let tests = self.tests()?;
                    let rules = rules.clone().ok_or(ParseError::RulesExpected)?;
                    test_suites.push(TestSuite::new(rules, tests));
                }
                _ => {
                    return Err(ParseError::InvalidToken(value));
                }
            }
        }
        self.mapping_end()?;
        self.document_end()?;
        self.stream_end()?;
        Ok(test_suites)
    }
}
