//! Fixed prompt texts for the three model-facing stages.
//!
//! The extraction prompt is a one-shot instruction with two worked
//! examples; it is sent together with the section's exam pages and the
//! matching marking-scheme pages so the model can cross-reference question
//! numbers.

/// Prompt for the extraction stage.
pub const EXTRACTION_PROMPT: &str = r#"I will give you an exam paper and the corresponding marking scheme from the official Leaving Certificate Exam of Ireland, containing several problems written in either English or Irish. They are extracted from PDF files as images.
Your task is to extract each problem and the corresponding marking scheme/answer.

Here are some guidelines you should follow
- For each problem found, use the following format:
Problem 1: <problem statement>
Answer 1: <answer to problem 1>

Problem 2: <problem statement>
Answer 2: <answer to problem 2>

...

- For each problem you identify, make sure to keep the original content, including the equations in LaTeX. Remove any redundant context, personal commentary, anecdotes, or unrelated information. But make sure not to change the meaning of the problem and keep all necessary mathematical or technical details.
- For each problem you identify, find the corresponding marking scheme/answer based on question number/part.
- If multiple problems that you extract are related, make sure to include all the context in each problem statement as they will be looked at independently.

Here are a few examples.


Example 1

Marking scheme:
Question 1: A sample of Ra-224 decays to form Pb-208, an isotope of lead.
(a) How many alpha-particles are released?
4
(b) How many beta-particles are released?
2

Output:
Problem 1: A sample of Ra-224 decays to form Pb-208, an isotope of lead.
How many alpha-particles are released?
Answer 1: 4

Problem 2: A sample of Ra-224 decays to form Pb-208, an isotope of lead.
How many beta-particles are released?
Answer 2: 2

Example 2

Marking scheme:
Question 1: A spectrometer can be used to measure the wavelength of light.
(i) Identify a different colour of light that could be used to produce a greater angle of
separation.
red / orange / yellow
(ii) Explain how the number of lines per mm on a diffraction grating affects the angle of
separation.
increased number of lines per mm means increased angle

Question 2: All matter and energy in the universe must abide by one or more of the four fundamental forces of nature.
(i) Which force is the weakest of the four forces?
gravitational force
(ii) Which force is responsible for binding the nucleus?
strong force

Output:
Problem 1: A spectrometer can be used to measure the wavelength of light.
Identify a different colour of light that could be used to produce a greater angle of
separation.
Answer 1: red / orange / yellow

Problem 2: A spectrometer can be used to measure the wavelength of light.
Explain how the number of lines per mm on a diffraction grating affects the angle of
separation.
Answer 2: increased number of lines per mm means increased angle

Problem 3: All matter and energy in the universe must abide by one or more of the four fundamental forces of nature.
Which force is the weakest of the four forces?
Answer 3: gravitational force

Problem 4: All matter and energy in the universe must abide by one or more of the four fundamental forces of nature.
Which force is responsible for binding the nucleus?
Answer 4: strong force


Please analyze the following exam and extract all problems. Here are the guidelines one more time for your reference
- For each problem found, use the following format:
Problem 1: <problem statement>
Answer 1: <answer to problem 1>

Problem 2: <problem statement>
Answer 2: <answer to problem 2>

...

- For each problem you identify, make sure to keep the original content, including the equations in LaTeX. Remove any redundant context, personal commentary, anecdotes, or unrelated information. But make sure not to change the meaning of the problem and keep all necessary mathematical or technical details.
- For each problem you identify, find the corresponding marking scheme/answer based on question number/part.
- If multiple problems that you extract are related, make sure to include all the context in each problem statement as they will be looked at independently.

Output:"#;

/// Appended to every problem statement in the response stage.
pub const RESPONSE_FORMAT_SUFFIX: &str = r#"
Your response should be in the following format:
Answer: {your answer to the above problem}
Confidence: {your confidence score between 0% and 100% for your answer}"#;

/// Judgement prompt template with `{question}`, `{response}` and
/// `{marking_scheme}` placeholders.
pub const JUDGEMENT_TEMPLATE: &str = r#"Judge whether the following [response] to [question] is correct or not based on the suggested marking scheme [marking_scheme] below.

[question]: {question} (also in attached images)

[response]: {response}

[marking_scheme]: {marking_scheme} (also in attached images)

Your judgement must be in the format and criteria specified below:

[extracted_final_answer]: The final exact answer extracted from the [response]. Put the extracted answer as 'None' if there is no exact, final answer to extract from the response.

[reasoning]: Explain why the extracted_final_answer is correct or incorrect based on [marking_scheme], focusing only on if the extracted_final_answer follows the [marking_scheme]. Do not comment on any background to the problem, do not attempt to solve the problem.

[correct]: Answer 'yes' if extracted_final_answer follows perfectly the [marking_scheme] given above, or is within a small margin of error for numerical problems. Answer 'no' otherwise, i.e. if there if there is any inconsistency, ambiguity, non-equivalency, or if the extracted answer is incorrect.

[confidence]: The extracted confidence score between 0% and 100% from [response]. Put 100 if there is no confidence score available."#;

/// Build the prompt for the response stage.
pub fn response_prompt(problem: &str) -> String {
    format!("{}{}", problem, RESPONSE_FORMAT_SUFFIX)
}

/// Fill the judgement template for one graded row.
pub fn judgement_prompt(question: &str, response: &str, marking_scheme: &str) -> String {
    JUDGEMENT_TEMPLATE
        .replace("{question}", question)
        .replace("{response}", response)
        .replace("{marking_scheme}", marking_scheme)
}
